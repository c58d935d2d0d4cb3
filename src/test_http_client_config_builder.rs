use ::std::sync::Arc;
use ::std::time::Duration;

use crate::RequestSpec;
use crate::TestHttpClientConfig;

/// This is for easing the building of [`TestHttpClientConfig`](crate::TestHttpClientConfig).
///
/// For full documentation see there.
///
/// ```rust
/// use ::axum_test_client::TestHttpClientConfig;
/// use ::std::time::Duration;
///
/// let config = TestHttpClientConfig::builder()
///     .timeout(Duration::from_secs(30))
///     .max_redirects(3)
///     .default_request(|spec| {
///         spec.header_str("x-api-key", "secret");
///     })
///     .build();
/// ```
///
/// These can be passed to `TestHttpClient::new_with_config`:
///
/// ```rust
/// # fn test() -> Result<(), Box<dyn ::std::error::Error>> {
/// #
/// use ::axum::Router;
/// use ::axum_test_client::TestHttpClient;
/// use ::axum_test_client::TestHttpClientConfig;
///
/// let my_app = Router::new();
/// let config = TestHttpClientConfig::builder()
///     .max_redirects(3)
///     .build();
///
/// let client = TestHttpClient::new_with_config(my_app, config)?;
/// #
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TestHttpClientConfigBuilder {
    config: TestHttpClientConfig,
}

impl TestHttpClientConfigBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.config.max_redirects = max_redirects;
        self
    }

    pub fn default_request<F>(mut self, default_request: F) -> Self
    where
        F: Fn(&mut RequestSpec) + Send + Sync + 'static,
    {
        self.config.default_request = Some(Arc::new(default_request));
        self
    }

    pub fn build(self) -> TestHttpClientConfig {
        self.config
    }
}
