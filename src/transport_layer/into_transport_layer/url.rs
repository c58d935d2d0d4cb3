use ::anyhow::Context;
use ::anyhow::Result;
use ::anyhow::bail;
use ::url::Url;

use super::IntoTransportLayer;
use crate::internals::HttpTransportLayer;
use crate::transport_layer::TransportLayer;

impl IntoTransportLayer for Url {
    fn into_transport_layer(self) -> Result<Box<dyn TransportLayer>> {
        if self.scheme() != "http" {
            bail!(
                "Only 'http' addresses are supported by the http transport, received '{}'",
                self
            );
        }

        let url = with_trailing_slash(self);
        Ok(Box::new(HttpTransportLayer::new(url)))
    }
}

impl IntoTransportLayer for &str {
    fn into_transport_layer(self) -> Result<Box<dyn TransportLayer>> {
        let url = Url::parse(self)
            .with_context(|| format!("Failed to parse application address '{self}'"))?;

        url.into_transport_layer()
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    url
}
