// # HTTP IP Source
//
// Resolves the public IP by asking an external echo service
// (e.g. https://checkip.amazonaws.com/) over HTTP.
//
// ## Contract
//
// - One GET per `resolve()` call, nothing cached between calls
// - Non-2xx responses and transport failures are `Error::IpSource`
// - The body is trimmed and returned as-is; it is not parsed as an address
// - An empty body is an error rather than an "IP" of ""

use cfddns_core::config::IpSourceConfig;
use cfddns_core::traits::IpSource;
use cfddns_core::{Error, Result};

use std::time::Duration;
use tracing::debug;

/// HTTP-based public IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL returning the caller's address as plain text
    url: String,

    /// HTTP client with the request timeout applied
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: Echo service URL (e.g., "https://checkip.amazonaws.com/")
    /// - `timeout`: Total request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create from the resolver section of the config
    pub fn from_config(config: &IpSourceConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.url.clone(), config.timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn resolve(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ip_source(format!(
                "{} answered with HTTP {}",
                self.url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        let ip = body.trim();
        if ip.is_empty() {
            return Err(Error::ip_source(format!("{} returned an empty body", self.url)));
        }

        debug!("Resolved {} via {}", ip, self.url);
        Ok(ip.to_string())
    }

    fn source_name(&self) -> &str {
        &self.url
    }
}
