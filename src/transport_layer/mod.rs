//!
//! The boundary between the client and the application it talks to.
//!
//! The client never sends requests itself. Each hop of a request is handed to
//! a [`TransportLayer`], which either calls an axum [`Router`](::axum::Router)
//! in process, or sends it over the network to a running server.
//!

mod into_transport_layer;
pub use self::into_transport_layer::*;

mod transport_layer;
pub use self::transport_layer::*;

mod transport_layer_type;
pub use self::transport_layer_type::*;
