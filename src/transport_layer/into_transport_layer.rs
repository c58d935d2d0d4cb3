use ::anyhow::Result;

use crate::transport_layer::TransportLayer;

mod router;
pub use self::router::*;

mod url;
pub use self::url::*;

mod socket_addr;
pub use self::socket_addr::*;

///
/// Turns an application, or the address of one, into a [`TransportLayer`]
/// for the [`TestHttpClient`](crate::TestHttpClient) to send requests through.
///
/// This is implemented for:
///
///  * an axum [`Router`](::axum::Router), which is called in process without a network,
///  * a [`Url`](::url::Url), `&str`, or [`SocketAddr`](::std::net::SocketAddr),
///    of a server which is already running, which is called over HTTP.
///
/// Implementing this will allow you to use the `TestHttpClient` against other types.
///
pub trait IntoTransportLayer: Sized {
    fn into_transport_layer(self) -> Result<Box<dyn TransportLayer>>;
}
