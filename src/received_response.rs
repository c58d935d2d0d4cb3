use ::anyhow::Context;
use ::anyhow::Result;
use ::axum::body::Body;
use ::bytes::Bytes;
use ::cookie::Cookie;
use ::http::HeaderMap;
use ::http::HeaderValue;
use ::http::Response;
use ::http::StatusCode;
use ::http::header;
use ::http::header::AsHeaderName;
use ::http_body_util::BodyExt;
use ::serde::de::DeserializeOwned;
use ::std::fmt::Display;
use ::url::Url;

use crate::internals::decode_set_cookie;

///
/// A response received from the application, with the body fully read.
///
/// The [`TestHttpClient`](crate::TestHttpClient) returns this for the last hop
/// of a request, and also hands it to redirect handlers for each redirect followed.
///
#[derive(Clone, Debug)]
pub struct ReceivedResponse {
    url: Url,
    status_code: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ReceivedResponse {
    pub fn new(url: Url, status_code: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            url,
            status_code,
            headers,
            body,
        }
    }

    pub(crate) async fn from_response(url: Url, response: Response<Body>) -> Result<Self> {
        let (parts, response_body) = response.into_parts();
        let body = response_body
            .collect()
            .await
            .with_context(|| format!("Failed to read response body, for request to {url}"))?
            .to_bytes();

        Ok(Self::new(url, parts.status, parts.headers, body))
    }

    /// The url this response was received from.
    /// After redirects this is the last url requested.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Finds the first header with the given name.
    pub fn maybe_header<N>(&self, header_name: N) -> Option<&HeaderValue>
    where
        N: AsHeaderName,
    {
        self.headers.get(header_name)
    }

    /// Finds the first header with the given name.
    ///
    /// If no header is found, then this will panic.
    #[track_caller]
    pub fn header<N>(&self, header_name: N) -> &HeaderValue
    where
        N: AsHeaderName + Display + Clone,
    {
        let debug_header = header_name.clone();
        match self.headers.get(header_name) {
            Some(value) => value,
            None => panic!(
                "Cannot find header {} for response from {}",
                debug_header, self.url
            ),
        }
    }

    /// Iterates over all of the values for a header.
    pub fn iter_headers_by_name<N>(&self, header_name: N) -> impl Iterator<Item = &HeaderValue>
    where
        N: AsHeaderName,
    {
        self.headers.get_all(header_name).iter()
    }

    /// Returns the body, as a UTF-8 string.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &Bytes {
        &self.body
    }

    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// Deserializes the body, as JSON, into the type given.
    ///
    /// If deserialization fails then this will panic.
    #[track_caller]
    #[must_use]
    pub fn json<T>(&self) -> T
    where
        T: DeserializeOwned,
    {
        match ::serde_json::from_slice::<T>(&self.body) {
            Ok(value) => value,
            Err(err) => panic!(
                "Failed to deserialize response from {} as JSON, {err}",
                self.url
            ),
        }
    }

    /// Iterates over the cookies set by this response.
    ///
    /// `Set-Cookie` headers which cannot be parsed are skipped.
    pub fn iter_cookies(&self) -> impl Iterator<Item = Cookie<'static>> + '_ {
        self.iter_headers_by_name(header::SET_COOKIE)
            .filter_map(decode_set_cookie)
    }

    /// Finds a cookie set by this response.
    /// If there are multiple with the same name, the first is returned.
    #[must_use]
    pub fn maybe_cookie(&self, cookie_name: &str) -> Option<Cookie<'static>> {
        self.iter_cookies()
            .find(|cookie| cookie.name() == cookie_name)
    }

    /// True for a redirect the client would follow.
    /// i.e. 301, 302, 303, 307, or 308, with a `Location` header.
    pub fn is_redirect(&self) -> bool {
        is_redirect_status(self.status_code) && self.headers.contains_key(header::LOCATION)
    }

    /// The `Location` header, when it is set and valid UTF-8.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|location| location.to_str().ok())
    }

    /// This performs an assertion comparing the whole body of the response,
    /// against the text provided.
    #[track_caller]
    pub fn assert_text<C>(&self, other: C)
    where
        C: AsRef<str>,
    {
        #[cfg(feature = "pretty-assertions")]
        use ::pretty_assertions::assert_eq;

        let other_contents = other.as_ref();
        assert_eq!(self.text(), other_contents);
    }

    /// Asserts the header is present, and its first value matches.
    #[track_caller]
    pub fn assert_header<N, V>(&self, header_name: N, expected: V)
    where
        N: AsHeaderName + Display + Clone,
        V: AsRef<str>,
    {
        #[cfg(feature = "pretty-assertions")]
        use ::pretty_assertions::assert_eq;

        let value = self.header(header_name).to_str().unwrap_or("<not utf-8>");
        assert_eq!(value, expected.as_ref());
    }

    /// Assert the response status code is 200.
    #[track_caller]
    pub fn assert_status_ok(&self) {
        self.assert_status(StatusCode::OK)
    }

    /// Assert the response status code is **not** 200.
    #[track_caller]
    pub fn assert_status_not_ok(&self) {
        self.assert_not_status(StatusCode::OK)
    }

    /// Assert the response status code matches the one given.
    #[track_caller]
    pub fn assert_status(&self, status_code: StatusCode) {
        #[cfg(feature = "pretty-assertions")]
        use ::pretty_assertions::assert_eq;

        assert_eq!(self.status_code(), status_code);
    }

    /// Assert the response status code does **not** match the one given.
    #[track_caller]
    pub fn assert_not_status(&self, status_code: StatusCode) {
        #[cfg(feature = "pretty-assertions")]
        use ::pretty_assertions::assert_ne;

        assert_ne!(self.status_code(), status_code);
    }
}

impl From<ReceivedResponse> for Bytes {
    fn from(response: ReceivedResponse) -> Self {
        response.into_bytes()
    }
}

pub(crate) fn is_redirect_status(status_code: StatusCode) -> bool {
    matches!(
        status_code,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

#[cfg(test)]
fn new_response(status_code: StatusCode, headers: &[(&'static str, &'static str)]) -> ReceivedResponse {
    let mut header_map = HeaderMap::new();
    for (name, value) in headers {
        header_map.append(*name, HeaderValue::from_static(*value));
    }

    ReceivedResponse::new(
        Url::parse("http://localhost/login").unwrap(),
        status_code,
        header_map,
        Bytes::from_static(br#"{"name":"Joe","age":20}"#),
    )
}


#[cfg(test)]
mod test_cookies {
    use super::*;

    #[test]
    fn it_should_iterate_cookies_skipping_malformed() {
        let response = new_response(
            StatusCode::OK,
            &[
                ("set-cookie", "first=1"),
                ("set-cookie", "garbage"),
                ("set-cookie", "second=2; Path=/a"),
            ],
        );

        let names: Vec<String> = response
            .iter_cookies()
            .map(|cookie| cookie.name().to_string())
            .collect();

        assert_eq!(names, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn it_should_find_cookie_by_name() {
        let response = new_response(StatusCode::OK, &[("set-cookie", "token=abc; Path=/")]);

        let cookie = response.maybe_cookie("token").unwrap();

        assert_eq!(cookie.value(), "abc");
        assert!(response.maybe_cookie("missing").is_none());
    }
}


#[cfg(test)]
mod test_assertions {
    use super::*;

    #[test]
    fn it_should_pass_status_ok_for_200() {
        new_response(StatusCode::OK, &[]).assert_status_ok();
    }

    #[test]
    #[should_panic]
    fn it_should_panic_status_ok_for_404() {
        new_response(StatusCode::NOT_FOUND, &[]).assert_status_ok();
    }

    #[test]
    fn it_should_pass_status_not_ok_for_404() {
        new_response(StatusCode::NOT_FOUND, &[]).assert_status_not_ok();
    }

    #[test]
    fn it_should_assert_header_value() {
        let response = new_response(StatusCode::SEE_OTHER, &[("location", "/dashboard")]);

        response.assert_header("location", "/dashboard");
    }

    #[test]
    #[should_panic]
    fn it_should_panic_for_missing_header() {
        let response = new_response(StatusCode::OK, &[]);

        let _ = response.header("location");
    }
}
