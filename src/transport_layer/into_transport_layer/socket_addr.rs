use ::anyhow::Context;
use ::anyhow::Result;
use ::std::net::SocketAddr;
use ::url::Url;

use super::IntoTransportLayer;
use crate::transport_layer::TransportLayer;

impl IntoTransportLayer for SocketAddr {
    fn into_transport_layer(self) -> Result<Box<dyn TransportLayer>> {
        let url = Url::parse(&format!("http://{self}/"))
            .with_context(|| format!("Failed to build address from socket '{self}'"))?;

        url.into_transport_layer()
    }
}
