use ::anyhow::Result;
use ::axum::Router;

use super::IntoTransportLayer;
use crate::internals::MockTransportLayer;
use crate::transport_layer::TransportLayer;

impl IntoTransportLayer for Router<()> {
    fn into_transport_layer(self) -> Result<Box<dyn TransportLayer>> {
        Ok(Box::new(MockTransportLayer::new(self)?))
    }
}
