use ::anyhow::Context;
use ::anyhow::Error as AnyhowError;
use ::anyhow::Result;
use ::anyhow::anyhow;
use ::axum::body::Body;
use ::bytes::Bytes;
use ::http::HeaderMap;
use ::http::HeaderName;
use ::http::HeaderValue;
use ::http::Method;
use ::http::Request;
use ::http::StatusCode;
use ::http::header;
use ::serde::Serialize;
use ::std::fmt::Debug;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;
use ::std::sync::Arc;
use ::url::Url;

use crate::ReceivedResponse;
use crate::internals::RequestPathFormatter;

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain";

/// The number of redirects followed before a redirect response
/// is handed back as the final response.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// A customization applied to an outgoing [`RequestSpec`].
pub type RequestAction = Arc<dyn Fn(&mut RequestSpec) + Send + Sync>;

/// Decides how the next hop of a redirect is customized.
///
/// It is called with the redirect response, before the redirect is followed.
/// Returning `None` leaves the next request as the client would build it.
pub type RedirectHandler = Arc<dyn Fn(&ReceivedResponse) -> Option<RequestAction> + Send + Sync>;

///
/// The outgoing request, as it is being configured.
///
/// Every request customization receives a `&mut RequestSpec`,
/// including customizations applied to the next hop of a redirect.
///
/// ```rust
/// # fn test() -> Result<(), Box<dyn ::std::error::Error>> {
/// #
/// use ::axum::Router;
/// use ::axum::routing::post;
/// use ::axum_test_client::TestHttpClient;
/// use ::http::Method;
///
/// let app = Router::new().route("/todo", post(|body: String| async move { body }));
/// let mut client = TestHttpClient::new(app)?;
///
/// let response = client.request("/todo", |spec| {
///     spec.method(Method::POST)
///         .header_str("x-request-id", "abc")
///         .text("buy milk");
/// });
///
/// response.assert_text("buy milk");
/// #
/// # Ok(())
/// # }
/// ```
///
/// Methods which convert values, like [`RequestSpec::header_str`] and [`RequestSpec::json`],
/// do not fail straight away. The first error is kept and returned when the request is sent.
pub struct RequestSpec {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Bytes,
    max_redirects: usize,
    redirect_handler: Option<RedirectHandler>,
    error: Option<AnyhowError>,
}

impl RequestSpec {
    pub(crate) fn new(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            redirect_handler: None,
            error: None,
        }
    }

    /// Sets the HTTP method.
    pub fn method(&mut self, method: Method) -> &mut Self {
        self.method = method;
        self
    }

    /// Adds a header, keeping any existing values for the same name.
    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.append(name, value);
        self
    }

    /// Adds a header from strings.
    ///
    /// Invalid names or values are reported when the request is sent.
    pub fn header_str(&mut self, name: &str, value: &str) -> &mut Self {
        let parsed = HeaderName::try_from(name)
            .with_context(|| format!("Invalid header name '{name}'"))
            .and_then(|name| {
                HeaderValue::from_str(value)
                    .with_context(|| format!("Invalid value '{value}' for header '{name}'"))
                    .map(|value| (name, value))
            });

        match parsed {
            Ok((name, value)) => self.header(name, value),
            Err(err) => self.fail(err),
        }
    }

    /// Replaces all values for the header with the one given.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn remove_header(&mut self, name: HeaderName) -> &mut Self {
        self.headers.remove(name);
        self
    }

    pub fn content_type(&mut self, content_type: &str) -> &mut Self {
        match HeaderValue::from_str(content_type) {
            Ok(value) => self.set_header(header::CONTENT_TYPE, value),
            Err(err) => {
                self.fail(anyhow!(err).context(format!("Invalid content type '{content_type}'")))
            }
        }
    }

    /// Sets the body as raw bytes.
    pub fn bytes(&mut self, body: Bytes) -> &mut Self {
        self.body = body;
        self
    }

    /// Sets the body as text.
    ///
    /// This sets the content type to `text/plain`, if one is not already set.
    pub fn text<S>(&mut self, raw_body: S) -> &mut Self
    where
        S: AsRef<str>,
    {
        self.set_default_content_type(TEXT_CONTENT_TYPE);
        self.bytes(Bytes::copy_from_slice(raw_body.as_ref().as_bytes()))
    }

    /// Sets the body to the value serialized as JSON.
    ///
    /// This sets the content type to `application/json`, if one is not already set.
    pub fn json<J>(&mut self, body: &J) -> &mut Self
    where
        J: ?Sized + Serialize,
    {
        match ::serde_json::to_vec(body) {
            Ok(body_bytes) => {
                self.set_default_content_type(JSON_CONTENT_TYPE);
                self.bytes(body_bytes.into())
            }
            Err(err) => self.fail(anyhow!(err).context("Failed to serialize request body as JSON")),
        }
    }

    /// Sets how many redirects will be followed.
    /// Set to `0` to receive redirect responses as they are.
    pub fn max_redirects(&mut self, max_redirects: usize) -> &mut Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Registers a function which is called on every redirect,
    /// to customize the request sent to the next location.
    ///
    /// This replaces any function registered before.
    pub fn on_redirect<F>(&mut self, redirect_handler: F) -> &mut Self
    where
        F: Fn(&ReceivedResponse) -> Option<RequestAction> + Send + Sync + 'static,
    {
        self.redirect_handler = Some(Arc::new(redirect_handler));
        self
    }

    pub fn get_method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn get_max_redirects(&self) -> usize {
        self.max_redirects
    }

    pub fn redirect_handler(&self) -> Option<&RedirectHandler> {
        self.redirect_handler.as_ref()
    }

    pub(crate) fn set_redirect_handler(&mut self, redirect_handler: Option<RedirectHandler>) {
        self.redirect_handler = redirect_handler;
    }

    pub(crate) fn take_redirect_handler(&mut self) -> Option<RedirectHandler> {
        self.redirect_handler.take()
    }

    /// Keeps the first error seen. It is returned when the request is built.
    pub(crate) fn fail(&mut self, error: AnyhowError) -> &mut Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    pub(crate) fn debug_request_format(&self) -> RequestPathFormatter<'_> {
        RequestPathFormatter::new(&self.method, &self.url)
    }

    /// Builds the request to send for this hop.
    ///
    /// A `Host` header is added, if one is not already set.
    pub(crate) fn build_request(&mut self) -> Result<Request<Body>> {
        if let Some(error) = self.error.take() {
            return Err(error.context(format!(
                "Failed to configure request {}",
                self.debug_request_format()
            )));
        }

        let mut request_builder = Request::builder()
            .method(self.method.clone())
            .uri(self.url.as_str());

        if !self.headers.contains_key(header::HOST) {
            if let Some(host) = host_header(&self.url) {
                let host_value = HeaderValue::from_str(&host)
                    .with_context(|| format!("Invalid host '{host}' for request"))?;
                request_builder = request_builder.header(header::HOST, host_value);
            }
        }

        for (name, value) in &self.headers {
            request_builder = request_builder.header(name, value);
        }

        request_builder
            .body(Body::from(self.body.clone()))
            .with_context(|| format!("Failed to build request {}", self.debug_request_format()))
    }

    /// Creates the spec for the next hop of a redirect.
    ///
    /// `303 See Other` switches to `GET` (unless this is a `HEAD`),
    /// as does a `301` or `302` after a `POST`. The body and content headers
    /// are then dropped. `307` and `308` keep the method and body.
    ///
    /// Headers are carried over, except `Cookie` and `Host`.
    pub(crate) fn redirect_to(&self, url: Url, status_code: StatusCode) -> Self {
        let is_switching_to_get = match status_code {
            StatusCode::SEE_OTHER => self.method != Method::HEAD,
            StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => self.method == Method::POST,
            _ => false,
        };

        let mut headers = self.headers.clone();
        headers.remove(header::COOKIE);
        headers.remove(header::HOST);

        let (method, body) = if is_switching_to_get {
            headers.remove(header::CONTENT_TYPE);
            headers.remove(header::CONTENT_LENGTH);
            (Method::GET, Bytes::new())
        } else {
            (self.method.clone(), self.body.clone())
        };

        Self {
            method,
            url,
            headers,
            body,
            max_redirects: self.max_redirects,
            redirect_handler: self.redirect_handler.clone(),
            error: None,
        }
    }

    fn set_default_content_type(&mut self, content_type: &'static str) {
        if !self.headers.contains_key(header::CONTENT_TYPE) {
            self.headers
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
    }
}

impl Debug for RequestSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RequestSpec")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("max_redirects", &self.max_redirects)
            .field("has_redirect_handler", &self.redirect_handler.is_some())
            .field("error", &self.error)
            .finish()
    }
}

fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let port = url.port_or_known_default().unwrap_or(80);

    Some(format!("{host}:{port}"))
}

#[cfg(test)]
fn new_spec(url: &str) -> RequestSpec {
    RequestSpec::new(Url::parse(url).unwrap())
}


#[cfg(test)]
mod test_body {
    use super::*;

    #[derive(Serialize)]
    struct Todo {
        description: &'static str,
    }

    #[test]
    fn it_should_set_text_body_and_content_type() {
        let mut spec = new_spec("http://localhost/");

        spec.text("hello!");

        assert_eq!(spec.body(), &Bytes::from_static(b"hello!"));
        assert_eq!(spec.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn it_should_set_json_body_and_content_type() {
        let mut spec = new_spec("http://localhost/");

        spec.json(&Todo {
            description: "buy milk",
        });

        assert_eq!(
            spec.body(),
            &Bytes::from_static(br#"{"description":"buy milk"}"#)
        );
        assert_eq!(
            spec.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn it_should_not_override_content_type_already_set() {
        let mut spec = new_spec("http://localhost/");

        spec.content_type("application/vnd.todo+json").json(&Todo {
            description: "buy milk",
        });

        assert_eq!(
            spec.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/vnd.todo+json"
        );
    }
}


#[cfg(test)]
mod test_redirect_to {
    use super::*;

    fn post_spec() -> RequestSpec {
        let mut spec = new_spec("http://localhost/login");
        spec.method(Method::POST)
            .text("username=joe")
            .header_str("x-request-id", "abc")
            .set_header(header::COOKIE, HeaderValue::from_static("old=1"));
        spec
    }

    #[test]
    fn it_should_switch_to_get_on_see_other() {
        let next = post_spec().redirect_to(
            Url::parse("http://localhost/dashboard").unwrap(),
            StatusCode::SEE_OTHER,
        );

        assert_eq!(next.get_method(), Method::GET);
        assert!(next.body().is_empty());
        assert!(next.headers().get(header::CONTENT_TYPE).is_none());
        assert_eq!(next.url().as_str(), "http://localhost/dashboard");
    }

    #[test]
    fn it_should_switch_post_to_get_on_found() {
        let next = post_spec().redirect_to(
            Url::parse("http://localhost/dashboard").unwrap(),
            StatusCode::FOUND,
        );

        assert_eq!(next.get_method(), Method::GET);
    }

    #[test]
    fn it_should_keep_method_and_body_on_temporary_redirect() {
        let next = post_spec().redirect_to(
            Url::parse("http://localhost/login2").unwrap(),
            StatusCode::TEMPORARY_REDIRECT,
        );

        assert_eq!(next.get_method(), Method::POST);
        assert_eq!(next.body(), &Bytes::from_static(b"username=joe"));
    }

    #[test]
    fn it_should_keep_put_on_found() {
        let mut spec = new_spec("http://localhost/item");
        spec.method(Method::PUT);

        let next = spec.redirect_to(
            Url::parse("http://localhost/item2").unwrap(),
            StatusCode::FOUND,
        );

        assert_eq!(next.get_method(), Method::PUT);
    }

    #[test]
    fn it_should_drop_cookie_header_and_keep_others() {
        let next = post_spec().redirect_to(
            Url::parse("http://localhost/dashboard").unwrap(),
            StatusCode::SEE_OTHER,
        );

        assert!(next.headers().get(header::COOKIE).is_none());
        assert_eq!(next.headers().get("x-request-id").unwrap(), "abc");
    }

    #[test]
    fn it_should_carry_over_redirect_settings() {
        let mut spec = post_spec();
        spec.max_redirects(3).on_redirect(|_| None);

        let next = spec.redirect_to(
            Url::parse("http://localhost/dashboard").unwrap(),
            StatusCode::SEE_OTHER,
        );

        assert_eq!(next.get_max_redirects(), 3);
        assert!(next.redirect_handler().is_some());
    }
}
