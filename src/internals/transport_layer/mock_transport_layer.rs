use ::anyhow::Context;
use ::anyhow::Result;
use ::axum::Router;
use ::axum::body::Body;
use ::http::Request;
use ::http::Response;
use ::std::fmt::Debug;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;
use ::std::future::Future;
use ::std::pin::Pin;
use ::tower::util::ServiceExt;
use ::url::Url;

use crate::transport_layer::TransportLayer;
use crate::transport_layer::TransportLayerType;

const MOCK_ADDRESS: &str = "http://localhost/";

/// Calls the `Router` directly, without going over the network.
pub struct MockTransportLayer {
    router: Router,
    url: Url,
}

impl MockTransportLayer {
    pub(crate) fn new(router: Router) -> Result<Self> {
        let url = Url::parse(MOCK_ADDRESS)
            .with_context(|| format!("Failed to parse mock address '{MOCK_ADDRESS}'"))?;

        Ok(Self { router, url })
    }
}

impl TransportLayer for MockTransportLayer {
    fn send<'a>(
        &'a self,
        request: Request<Body>,
    ) -> Pin<Box<dyn 'a + Future<Output = Result<Response<Body>>>>> {
        Box::pin(async {
            let router = self.router.clone();
            let response = router.oneshot(request).await?;

            Ok(response)
        })
    }

    fn url(&self) -> &Url {
        &self.url
    }

    fn transport_type(&self) -> TransportLayerType {
        TransportLayerType::Mock
    }
}

impl Debug for MockTransportLayer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "MockTransportLayer {{ router: {{unknown}}, url: {} }}", self.url)
    }
}
