use ::anyhow::Context;
use ::anyhow::Result;
use ::cookie::Cookie;
use ::http::Method;
use ::serde::Serialize;
use ::std::fmt::Debug;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;
use ::std::sync::Arc;
use ::std::sync::Mutex;
use ::url::Url;

use crate::CookieStore;
use crate::ReceivedResponse;
use crate::RequestAction;
use crate::RequestSpec;
use crate::TestHttpClientConfig;
use crate::internals::BlockingHttpClient;
use crate::internals::CookieHandlingRequestSpec;
use crate::internals::QueryParamsStore;
use crate::internals::with_this_mut;
use crate::transport_layer::IntoTransportLayer;
use crate::transport_layer::TransportLayer;
use crate::transport_layer::TransportLayerType;

///
/// A blocking HTTP client for driving an application under test,
/// which keeps cookies between requests like a browser would.
///
/// Cookies set by a response are stored, and sent on later requests
/// whose path they match. This includes the hops of redirects,
/// which are followed automatically.
///
/// ```rust
/// # fn test() -> Result<(), Box<dyn ::std::error::Error>> {
/// #
/// use ::axum::Router;
/// use ::axum::http::header::SET_COOKIE;
/// use ::axum::http::HeaderMap;
/// use ::axum::response::Redirect;
/// use ::axum::routing::get;
/// use ::axum_test_client::TestHttpClient;
///
/// async fn login() -> ([(::axum::http::HeaderName, &'static str); 1], Redirect) {
///     ([(SET_COOKIE, "token=abc")], Redirect::to("/dashboard"))
/// }
///
/// async fn dashboard(headers: HeaderMap) -> String {
///     headers["cookie"].to_str().unwrap().to_string()
/// }
///
/// let app = Router::new()
///     .route("/login", get(login))
///     .route("/dashboard", get(dashboard));
///
/// let mut client = TestHttpClient::new(app)?;
///
/// // The redirect to `/dashboard` carries the cookie set by `/login`.
/// client.get("/login").assert_text("token=abc");
/// #
/// # Ok(())
/// # }
/// ```
///
/// Requests are customized in layers. Each request starts as a `GET`,
/// then has applied (in order) the `default_request` from the [`TestHttpClientConfig`],
/// the customization set with [`TestHttpClient::request_spec`],
/// and finally the customization passed to the call itself.
///
/// The client blocks the calling thread until a request has finished,
/// and so it must not be used from within an async runtime.
/// It is built for one request at a time, from a single thread.
///
pub struct TestHttpClient {
    transport: Box<dyn TransportLayer>,
    dispatcher: BlockingHttpClient,
    config: TestHttpClientConfig,
    cookie_store: Arc<Mutex<CookieStore>>,
    session_request: Option<RequestAction>,
    query_params: QueryParamsStore,
    response: Option<ReceivedResponse>,
}

impl TestHttpClient {
    /// Creates a client for the given application,
    /// using the default [`TestHttpClientConfig`].
    pub fn new<A>(app: A) -> Result<Self>
    where
        A: IntoTransportLayer,
    {
        Self::new_with_config(app, TestHttpClientConfig::default())
    }

    /// This very similar to [`TestHttpClient::new()`],
    /// however you can customise the configuration.
    pub fn new_with_config<A>(app: A, config: TestHttpClientConfig) -> Result<Self>
    where
        A: IntoTransportLayer,
    {
        let transport = app
            .into_transport_layer()
            .context("Failed to create transport for TestHttpClient")?;
        let dispatcher = BlockingHttpClient::new()?;

        Ok(Self {
            transport,
            dispatcher,
            config,
            cookie_store: Arc::new(Mutex::new(CookieStore::new())),
            session_request: None,
            query_params: QueryParamsStore::new(),
            response: None,
        })
    }

    /// The address of the application.
    /// Paths given to requests are relative to this.
    pub fn address(&self) -> &Url {
        self.transport.url()
    }

    pub fn transport_type(&self) -> TransportLayerType {
        self.transport.transport_type()
    }

    /// Sets a customization to apply to all future requests,
    /// after the config's `default_request`, and before the one given to each call.
    ///
    /// This replaces any customization set before,
    /// and lasts until [`TestHttpClient::reset_request`] is called.
    pub fn request_spec<F>(&mut self, request_action: F) -> &mut Self
    where
        F: Fn(&mut RequestSpec) + Send + Sync + 'static,
    {
        self.session_request = Some(Arc::new(request_action));
        self
    }

    /// Removes the customization set with [`TestHttpClient::request_spec`],
    /// and all stored cookies.
    pub fn reset_request(&mut self) {
        self.session_request = None;
        with_this_mut(&self.cookie_store, |store| store.clear());
    }

    /// Adds query parameters to be sent on *all* future requests.
    pub fn add_query_params<V>(&mut self, query_params: V) -> Result<()>
    where
        V: Serialize,
    {
        self.query_params
            .add(query_params)
            .context("Trying to add_query_params")
    }

    /// Adds a query parameter to be sent on *all* future requests.
    pub fn add_query_param<V>(&mut self, key: &str, value: V) -> Result<()>
    where
        V: Serialize,
    {
        self.query_params
            .add(&[(key, value)])
            .with_context(|| format!("Trying to add_query_param '{key}'"))
    }

    /// Adds an already encoded query string, such as `key=value&other=value`,
    /// to be sent on *all* future requests.
    pub fn add_raw_query_param(&mut self, query_param: &str) {
        self.query_params.add_raw(query_param.to_string());
    }

    /// Clears all query params set.
    pub fn clear_query_params(&mut self) {
        self.query_params.clear();
    }

    /// Stores a cookie, as though it was set by a response.
    ///
    /// A cookie with an empty value removes all cookies with that name.
    pub fn add_cookie(&mut self, cookie: Cookie<'static>) {
        with_this_mut(&self.cookie_store, |store| store.store_cookie(cookie));
    }

    /// Removes all stored cookies.
    pub fn clear_cookies(&mut self) {
        with_this_mut(&self.cookie_store, |store| store.clear());
    }

    /// The stored cookies which would be sent on a request to the given path.
    pub fn cookies(&self, path: &str) -> Vec<Cookie<'static>> {
        with_this_mut(&self.cookie_store, |store| store.matching(path))
    }

    /// The response to the last request made, if there has been one.
    pub fn response(&self) -> Option<&ReceivedResponse> {
        self.response.as_ref()
    }

    /// Sends a `GET` request to the path.
    #[track_caller]
    pub fn get(&mut self, path: &str) -> ReceivedResponse {
        self.method(Method::GET, path)
    }

    /// Sends a `GET` request to the path, and returns the response body as text.
    #[track_caller]
    pub fn get_text(&mut self, path: &str) -> String {
        self.get(path).text()
    }

    /// Sends a `HEAD` request to the path.
    #[track_caller]
    pub fn head(&mut self, path: &str) -> ReceivedResponse {
        self.method(Method::HEAD, path)
    }

    /// Sends an `OPTIONS` request to the path.
    #[track_caller]
    pub fn options(&mut self, path: &str) -> ReceivedResponse {
        self.method(Method::OPTIONS, path)
    }

    #[track_caller]
    pub fn options_text(&mut self, path: &str) -> String {
        self.options(path).text()
    }

    /// Sends a `POST` request to the path.
    #[track_caller]
    pub fn post(&mut self, path: &str) -> ReceivedResponse {
        self.method(Method::POST, path)
    }

    #[track_caller]
    pub fn post_text(&mut self, path: &str) -> String {
        self.post(path).text()
    }

    /// Sends a `PUT` request to the path.
    #[track_caller]
    pub fn put(&mut self, path: &str) -> ReceivedResponse {
        self.method(Method::PUT, path)
    }

    #[track_caller]
    pub fn put_text(&mut self, path: &str) -> String {
        self.put(path).text()
    }

    /// Sends a `PATCH` request to the path.
    #[track_caller]
    pub fn patch(&mut self, path: &str) -> ReceivedResponse {
        self.method(Method::PATCH, path)
    }

    #[track_caller]
    pub fn patch_text(&mut self, path: &str) -> String {
        self.patch(path).text()
    }

    /// Sends a `DELETE` request to the path.
    #[track_caller]
    pub fn delete(&mut self, path: &str) -> ReceivedResponse {
        self.method(Method::DELETE, path)
    }

    #[track_caller]
    pub fn delete_text(&mut self, path: &str) -> String {
        self.delete(path).text()
    }

    /// Sends a request to the path, using the given method.
    #[track_caller]
    pub fn method(&mut self, method: Method, path: &str) -> ReceivedResponse {
        self.request(path, move |spec| {
            spec.method(method);
        })
    }

    /// Sends a request to the path, customized by the action given.
    ///
    /// If the request fails, this will panic.
    /// See [`TestHttpClient::try_request`] for a version which returns the error.
    #[track_caller]
    pub fn request<F>(&mut self, path: &str, request_action: F) -> ReceivedResponse
    where
        F: FnOnce(&mut RequestSpec),
    {
        match self.try_request(path, request_action) {
            Ok(response) => response,
            Err(err) => panic!("Request to '{path}' failed, {err:?}"),
        }
    }

    /// Sends a request to the path, customized by the action given.
    ///
    /// `path` may be relative to the [`TestHttpClient::address`], or an absolute url.
    ///
    /// Cookies set on any hop are stored, including when a later hop fails.
    pub fn try_request<F>(&mut self, path: &str, request_action: F) -> Result<ReceivedResponse>
    where
        F: FnOnce(&mut RequestSpec),
    {
        let url = self.build_url(path)?;
        let debug_url = url.to_string();

        let cookie_store = self.cookie_store.clone();
        let default_request = self.config.default_request.clone();
        let session_request = self.session_request.clone();
        let max_redirects = self.config.max_redirects;

        let response = self
            .dispatcher
            .request(
                self.transport.as_ref(),
                url,
                self.config.timeout,
                move |spec| {
                    let mut decorated = CookieHandlingRequestSpec::new(spec, cookie_store);
                    decorated.method(Method::GET).max_redirects(max_redirects);

                    if let Some(default_request) = &default_request {
                        default_request(&mut *decorated);
                    }
                    if let Some(session_request) = &session_request {
                        session_request(&mut *decorated);
                    }
                    request_action(&mut *decorated);

                    decorated.seal();
                },
            )
            .with_context(|| format!("Request to {debug_url} failed"))?;

        with_this_mut(&self.cookie_store, |store| store.record(&response));
        self.response = Some(response.clone());

        Ok(response)
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let mut url = match Url::parse(path) {
            Ok(absolute_url) if !absolute_url.cannot_be_a_base() => absolute_url,
            _ => {
                let relative_path = path.strip_prefix('/').unwrap_or(path);
                let full_url = format!("{}{relative_path}", self.address());

                Url::parse(&full_url)
                    .with_context(|| format!("Failed to build url for path '{path}'"))?
            }
        };

        self.query_params.apply_to_url(&mut url);
        Ok(url)
    }
}

impl Debug for TestHttpClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TestHttpClient")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .field("cookie_store", &self.cookie_store)
            .field("has_session_request", &self.session_request.is_some())
            .field("query_params", &self.query_params)
            .field("response", &self.response)
            .finish()
    }
}

#[cfg(test)]
mod test_app {
    use ::axum::Router;
    use ::axum::extract::Query;
    use ::axum::extract::RawQuery;
    use ::axum::extract::Request;
    use ::axum::http::HeaderMap;
    use ::axum::http::HeaderName;
    use ::axum::http::header::COOKIE;
    use ::axum::http::header::SET_COOKIE;
    use ::axum::response::IntoResponse;
    use ::axum::response::Redirect;
    use ::axum::routing::any;
    use ::axum::routing::get;
    use ::serde::Deserialize;
    use ::std::time::Duration;

    pub const NO_HEADER: &str = "<none>";

    #[derive(Deserialize)]
    struct SetCookieParams {
        cookie: String,
    }

    /// Returns the `Cookie` header sent, or `<none>`.
    async fn echo_cookie_header(headers: HeaderMap) -> String {
        headers
            .get(COOKIE)
            .map(|value| value.to_str().unwrap().to_string())
            .unwrap_or_else(|| NO_HEADER.to_string())
    }

    /// Returns all `x-hop` header values sent, joined by commas, or `<none>`.
    async fn echo_hop_headers(headers: HeaderMap) -> String {
        let values: Vec<&str> = headers
            .get_all("x-hop")
            .iter()
            .map(|value| value.to_str().unwrap())
            .collect();

        if values.is_empty() {
            NO_HEADER.to_string()
        } else {
            values.join(",")
        }
    }

    async fn set_cookie(Query(params): Query<SetCookieParams>) -> impl IntoResponse {
        ([(SET_COOKIE, params.cookie)], "cookie set")
    }

    async fn login() -> ([(HeaderName, &'static str); 1], Redirect) {
        ([(SET_COOKIE, "token=abc")], Redirect::to("/dashboard"))
    }

    async fn login_then_hop() -> ([(HeaderName, &'static str); 1], Redirect) {
        ([(SET_COOKIE, "token=abc")], Redirect::to("/hop"))
    }

    async fn login_then_slow() -> ([(HeaderName, &'static str); 1], Redirect) {
        ([(SET_COOKIE, "token=abc")], Redirect::to("/slow"))
    }

    async fn logout() -> ([(HeaderName, &'static str); 1], Redirect) {
        ([(SET_COOKIE, "token=; Path=/")], Redirect::to("/dashboard"))
    }

    async fn logout_quoted() -> ([(HeaderName, &'static str); 1], Redirect) {
        ([(SET_COOKIE, "token=\"\"; Path=/")], Redirect::to("/dashboard"))
    }

    async fn admin_login() -> ([(HeaderName, &'static str); 1], Redirect) {
        ([(SET_COOKIE, "admin=yes; Path=/admin")], Redirect::to("/admin/panel"))
    }

    async fn slow() -> &'static str {
        ::tokio::time::sleep(Duration::from_secs(5)).await;
        "too late"
    }

    async fn method(request: Request) -> String {
        request.method().to_string()
    }

    async fn raw_query(RawQuery(query): RawQuery) -> String {
        query.unwrap_or_else(|| NO_HEADER.to_string())
    }

    pub fn new_app() -> Router {
        Router::new()
            .route("/set", get(set_cookie))
            .route("/login", get(login))
            .route("/login-then-hop", get(login_then_hop))
            .route("/login-then-slow", get(login_then_slow))
            .route("/logout", get(logout))
            .route("/logout-quoted", get(logout_quoted))
            .route("/admin/login", get(admin_login))
            .route("/hop", get(echo_hop_headers))
            .route("/slow", get(slow))
            .route("/method", any(method))
            .route("/query", get(raw_query))
            .fallback(echo_cookie_header)
    }

    pub fn set_cookie_path(cookie: &str) -> String {
        let query = ::serde_urlencoded::to_string([("cookie", cookie)]).unwrap();
        format!("/set?{query}")
    }
}

#[cfg(test)]
mod test_get {
    use super::test_app::*;
    use super::*;
    use ::http::StatusCode;

    #[test]
    fn it_should_get_response_from_app() {
        let mut client = TestHttpClient::new(new_app()).unwrap();

        let response = client.get("/method");

        response.assert_status_ok();
        response.assert_text("GET");
    }

    #[test]
    fn it_should_accept_paths_without_leading_slash() {
        let mut client = TestHttpClient::new(new_app()).unwrap();

        client.get("method").assert_text("GET");
    }

    #[test]
    fn it_should_accept_absolute_urls() {
        let mut client = TestHttpClient::new(new_app()).unwrap();

        client.get("http://localhost/method").assert_text("GET");
    }

    #[test]
    fn it_should_return_text() {
        let mut client = TestHttpClient::new(new_app()).unwrap();

        assert_eq!(client.get_text("/method"), "GET");
    }

    #[test]
    fn it_should_return_not_found_without_panicking() {
        let app: ::axum::Router = ::axum::Router::new();
        let mut client = TestHttpClient::new(app).unwrap();

        client.get("/missing").assert_status(StatusCode::NOT_FOUND);
    }
}
