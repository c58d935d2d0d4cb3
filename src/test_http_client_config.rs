use ::std::fmt::Debug;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;
use ::std::time::Duration;

use crate::DEFAULT_MAX_REDIRECTS;
use crate::RequestAction;
use crate::TestHttpClientConfigBuilder;

/// How long a request, including all of its redirects, may take by default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// The basic setup for the `TestHttpClient`.
#[derive(Clone)]
pub struct TestHttpClientConfig {
    /// How long a request may take, across every hop of its redirects,
    /// before it fails.
    ///
    /// **Defaults** to 60 minutes.
    pub timeout: Duration,

    /// How many redirects to follow, before the redirect response
    /// is returned as it is.
    ///
    /// This can be changed per request with [`RequestSpec::max_redirects`](crate::RequestSpec::max_redirects).
    ///
    /// **Defaults** to 10.
    pub max_redirects: usize,

    /// A customization applied to every request, before any others.
    ///
    /// Unlike [`TestHttpClient::request_spec`](crate::TestHttpClient::request_spec),
    /// this is kept when calling [`TestHttpClient::reset_request`](crate::TestHttpClient::reset_request).
    ///
    /// **Defaults** to none.
    pub default_request: Option<RequestAction>,
}

impl TestHttpClientConfig {
    pub fn builder() -> TestHttpClientConfigBuilder {
        TestHttpClientConfigBuilder::default()
    }
}

impl Default for TestHttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            default_request: None,
        }
    }
}

impl Debug for TestHttpClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TestHttpClientConfig")
            .field("timeout", &self.timeout)
            .field("max_redirects", &self.max_redirects)
            .field("has_default_request", &self.default_request.is_some())
            .finish()
    }
}
