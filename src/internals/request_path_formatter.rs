use ::http::Method;
use ::std::fmt;
use ::url::Url;

/// Formats a request as `METHOD url`, for use in error messages and logs.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPathFormatter<'a> {
    method: &'a Method,
    url: &'a Url,
}

impl<'a> RequestPathFormatter<'a> {
    pub fn new(method: &'a Method, url: &'a Url) -> Self {
        Self { method, url }
    }
}

impl fmt::Display for RequestPathFormatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = &self.method;
        let url = &self.url;

        write!(f, "{method} {url}")
    }
}
