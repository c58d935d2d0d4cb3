use ::anyhow::Result;
use ::axum::body::Body;
use ::http::Request;
use ::http::Response;
use ::std::fmt::Debug;
use ::std::future::Future;
use ::std::pin::Pin;
use ::url::Url;

use crate::transport_layer::TransportLayerType;

/// Sends a single request to the application, and returns its response.
///
/// Redirects are not followed here. That is done by the client,
/// which calls `send` once for each hop.
pub trait TransportLayer: Debug + Send + Sync {
    fn send<'a>(
        &'a self,
        request: Request<Body>,
    ) -> Pin<Box<dyn 'a + Future<Output = Result<Response<Body>>>>>;

    /// The address of the application.
    ///
    /// Relative request paths are resolved against this.
    /// It always ends with a `/`.
    fn url(&self) -> &Url;

    fn transport_type(&self) -> TransportLayerType;
}
