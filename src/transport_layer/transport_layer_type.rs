use ::std::fmt::Display;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;

/// Which kind of transport a [`TransportLayer`](crate::transport_layer::TransportLayer) is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportLayerType {
    /// Requests are passed directly to a `Router`, without a network.
    Mock,

    /// Requests are sent over the network to a running server.
    Http,
}

impl Display for TransportLayerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::Http => write!(f, "http"),
        }
    }
}
