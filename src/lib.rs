//!
//! Axum Test Client is a blocking HTTP client for writing tests against web applications,
//! which keeps cookies between requests the way a browser would:
//!
//!  * You create a [`TestHttpClient`] for your Axum [`Router`](::axum::Router), or a running server,
//!  * make requests against it with `get`, `post`, and friends,
//!  * receive back a [`ReceivedResponse`],
//!  * then assert the response is how you expect.
//!
//! Redirects are followed automatically. Cookies set by a redirect are sent on
//! the next hop, so a login which redirects to a dashboard just works.
//!
//! ## Getting Started
//!
//! ```rust
//! # fn test() -> Result<(), Box<dyn ::std::error::Error>> {
//! #
//! use ::axum::Router;
//! use ::axum::routing::get;
//! use ::axum_test_client::TestHttpClient;
//!
//! let my_app = Router::new()
//!     .route("/ping", get(|| async { "pong!" }));
//!
//! let mut client = TestHttpClient::new(my_app)?;
//!
//! let response = client.get("/ping");
//! response.assert_status_ok();
//! response.assert_text("pong!");
//! #
//! # Ok(())
//! # }
//! ```
//!
//! The client blocks the calling thread while a request runs,
//! so it is used from plain `#[test]` functions rather than async ones.
//!
//! ## Cookies 🍪
//!
//! Cookies are stored per path. A request is sent the cookies stored at `/`,
//! plus those whose path is a prefix of the request path.
//! A cookie set with an empty value removes that cookie from every path.
//!
//! The stored cookies can be inspected with [`TestHttpClient::cookies`],
//! and cleared with [`TestHttpClient::clear_cookies`] or [`TestHttpClient::reset_request`].
//!
//! ## Customising Requests
//!
//! Every request starts as a `GET`, and can be customised in three layers:
//!
//! ```rust
//! # fn test() -> Result<(), Box<dyn ::std::error::Error>> {
//! #
//! use ::axum::Router;
//! use ::axum_test_client::TestHttpClient;
//! use ::axum_test_client::TestHttpClientConfig;
//! use ::axum_test_client::http::Method;
//!
//! // For all requests, from the config.
//! let config = TestHttpClientConfig::builder()
//!     .default_request(|spec| {
//!         spec.header_str("x-client", "tests");
//!     })
//!     .build();
//!
//! let my_app = Router::new();
//! let mut client = TestHttpClient::new_with_config(my_app, config)?;
//!
//! // For all requests, until `reset_request` is called.
//! client.request_spec(|spec| {
//!     spec.header_str("authorization", "Bearer abc123");
//! });
//!
//! // For just this request.
//! let response = client.request("/users", |spec| {
//!     spec.method(Method::POST).text("Terrance Pencilworth");
//! });
//! #
//! # Ok(())
//! # }
//! ```
//!
//! Redirect handlers, set with [`RequestSpec::on_redirect`], are called for every redirect followed.
//! The customisation they return is applied to the next hop, after its cookies have been set.
//!
//! ## Crate Features
//!
//! Here are a list of all features so far that can be enabled:
//!
//!  * `all` _off by default_, turns on all features below.
//!  * `pretty-assertions` **on by default**, uses the [pretty assertions crate](https://crates.io/crates/pretty_assertions) for the output to the `assert_*` functions.
//!

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub(crate) mod internals;

pub mod transport_layer;

mod cookie_store;
pub use self::cookie_store::*;

mod request_spec;
pub use self::request_spec::*;

mod received_response;
pub use self::received_response::*;

mod test_http_client_config_builder;
pub use self::test_http_client_config_builder::*;

mod test_http_client_config;
pub use self::test_http_client_config::*;

mod test_http_client;
pub use self::test_http_client::*;

pub use ::cookie;
pub use ::http;
