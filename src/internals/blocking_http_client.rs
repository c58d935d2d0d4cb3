use ::anyhow::Context;
use ::anyhow::Result;
use ::anyhow::anyhow;
use ::std::time::Duration;
use ::tokio::runtime::Builder as RuntimeBuilder;
use ::tokio::runtime::Runtime;
use ::url::Url;

use crate::ReceivedResponse;
use crate::RequestSpec;
use crate::transport_layer::TransportLayer;

/// Sends requests and follows their redirects, blocking the calling thread
/// until the whole chain has finished.
///
/// Each hop is sent through the `TransportLayer`. Before a redirect is followed,
/// the redirect handler of the current spec is called once with the redirect
/// response, and any action it returns is applied to the next hop.
#[derive(Debug)]
pub struct BlockingHttpClient {
    runtime: Runtime,
}

impl BlockingHttpClient {
    pub fn new() -> Result<Self> {
        let runtime = RuntimeBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build runtime for sending requests")?;

        Ok(Self { runtime })
    }

    /// Sends a request to the url, after `configure` has been run on its spec.
    ///
    /// The timeout covers every hop of the redirect chain.
    /// This must not be called from within an async runtime.
    pub fn request<F>(
        &self,
        transport: &dyn TransportLayer,
        url: Url,
        timeout: Duration,
        configure: F,
    ) -> Result<ReceivedResponse>
    where
        F: FnOnce(&mut RequestSpec),
    {
        let mut spec = RequestSpec::new(url);
        configure(&mut spec);

        let debug_request = spec.debug_request_format().to_string();
        let chain = send_following_redirects(transport, spec);

        self.runtime
            .block_on(async { ::tokio::time::timeout(timeout, chain).await })
            .map_err(|_| anyhow!("Request {debug_request} timed out after {timeout:?}"))?
    }
}

async fn send_following_redirects(
    transport: &dyn TransportLayer,
    mut spec: RequestSpec,
) -> Result<ReceivedResponse> {
    let mut redirect_count = 0;

    loop {
        let url = spec.url().clone();
        ::tracing::debug!(
            request = %spec.debug_request_format(),
            transport = %transport.transport_type(),
            redirect_count,
            "sending request"
        );

        let request = spec.build_request()?;
        let response = transport
            .send(request)
            .await
            .with_context(|| format!("Sending request {}", spec.debug_request_format()))?;
        let received = ReceivedResponse::from_response(url, response).await?;

        if redirect_count >= spec.get_max_redirects() || !received.is_redirect() {
            return Ok(received);
        }

        let next_url = next_redirect_url(&received)?;
        ::tracing::debug!(
            status = %received.status_code(),
            from = %received.url(),
            to = %next_url,
            "following redirect"
        );

        let mut next_spec = spec.redirect_to(next_url, received.status_code());
        let next_action = spec
            .redirect_handler()
            .and_then(|redirect_handler| redirect_handler(&received));
        if let Some(next_action) = next_action {
            next_action(&mut next_spec);
        }

        spec = next_spec;
        redirect_count += 1;
    }
}

fn next_redirect_url(received: &ReceivedResponse) -> Result<Url> {
    let location = received.location().with_context(|| {
        format!(
            "Redirect from {} has a 'Location' header which is not valid UTF-8",
            received.url()
        )
    })?;

    received.url().join(location).with_context(|| {
        format!(
            "Failed to resolve redirect location '{location}', from {}",
            received.url()
        )
    })
}
