use ::anyhow::Result;
use ::axum::body::Body;
use ::http::Request;
use ::http::Response;
use ::hyper_util::client::legacy::Client;
use ::hyper_util::rt::TokioExecutor;
use ::std::future::Future;
use ::std::pin::Pin;
use ::url::Url;

use crate::transport_layer::TransportLayer;
use crate::transport_layer::TransportLayerType;

/// Sends requests over the network, to a server which is already running.
#[derive(Debug)]
pub struct HttpTransportLayer {
    url: Url,
}

impl HttpTransportLayer {
    pub(crate) fn new(url: Url) -> Self {
        Self { url }
    }
}

impl TransportLayer for HttpTransportLayer {
    fn send<'a>(
        &'a self,
        request: Request<Body>,
    ) -> Pin<Box<dyn 'a + Future<Output = Result<Response<Body>>>>> {
        Box::pin(async {
            let client = Client::builder(TokioExecutor::new()).build_http();
            let hyper_response = client.request(request).await?;

            let (parts, response_body) = hyper_response.into_parts();
            let returned_response: Response<Body> =
                Response::from_parts(parts, Body::new(response_body));

            Ok(returned_response)
        })
    }

    fn url(&self) -> &Url {
        &self.url
    }

    fn transport_type(&self) -> TransportLayerType {
        TransportLayerType::Http
    }
}
