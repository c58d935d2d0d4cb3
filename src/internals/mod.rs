mod transport_layer;
pub use self::transport_layer::*;

mod blocking_http_client;
pub use self::blocking_http_client::*;

mod cookie_codec;
pub use self::cookie_codec::*;

mod cookie_handling_request_spec;
pub use self::cookie_handling_request_spec::*;

mod request_path_formatter;
pub use self::request_path_formatter::*;

mod query_params_store;
pub use self::query_params_store::*;

mod with_this_mut;
pub use self::with_this_mut::*;
