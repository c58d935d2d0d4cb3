mod http_transport_layer;
pub use self::http_transport_layer::*;

mod mock_transport_layer;
pub use self::mock_transport_layer::*;
