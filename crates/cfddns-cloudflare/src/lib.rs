// # Cloudflare DNS Provider
//
// Points a single A record at a new address through the Cloudflare API v4.
//
// ## Call Sequence
//
// Each `update_record` call is strictly sequential, with no retries and no
// caching of zone or record IDs between calls:
//
// 1. GET `/zones?name=<zone>&status=active` -> first zone id
// 2. GET `/zones/:zone_id/dns_records?type=A&name=<record>` -> first record id
// 3. PUT `/zones/:zone_id/dns_records/:record_id` with the new content
//
// A 403 at any step is `UpdateResult::AuthFailure`. Empty lookups are
// `ZoneNotFound` / `RecordNotFound`. Any lookup status other than 200 is an
// `Err(Error::Http)`; any PUT status other than 200 is `UpdateRejected`
// carrying the raw response body.
//
// ## Security
//
// - The API token never appears in logs or in `Debug` output
// - With no token configured, no request is sent at all
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/

use async_trait::async_trait;
use cfddns_core::config::ProviderConfig;
use cfddns_core::traits::{DnsProvider, UpdateResult};
use cfddns_core::{Error, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

const PROVIDER: &str = "cloudflare";

/// Only IPv4 records are managed
const RECORD_TYPE: &str = "A";

/// List endpoints wrap their payload in `result`
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    result: Option<Vec<Resource>>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    id: String,
}

/// PUT body for a DNS record
#[derive(Debug, Serialize)]
struct RecordUpdate<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

/// Outcome of a zone or record lookup
#[derive(Debug, PartialEq, Eq)]
enum Lookup {
    Found(String),
    Missing,
    Unauthorized,
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is set the provider still performs both lookups, logs the
/// PUT it would have sent, and reports `Success` without modifying DNS.
pub struct CloudflareProvider {
    /// Bearer token; never log this value
    api_token: String,

    zone_name: String,
    record_name: String,
    ttl: u32,

    /// API base URL without trailing slash
    api_base: String,

    /// HTTP client with the request timeout applied
    client: reqwest::Client,

    dry_run: bool,
}

// Hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_name", &self.zone_name)
            .field("record_name", &self.record_name)
            .field("ttl", &self.ttl)
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// An empty token is accepted; every update then reports `AuthFailure`
    /// without touching the network.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        if config.dry_run {
            warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            api_token: config.api_token.clone(),
            zone_name: config.zone_name.clone(),
            record_name: config.record_name.clone(),
            ttl: config.ttl.as_api_value(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
            dry_run: config.dry_run,
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// GET a list endpoint and pick the first id from `result`
    ///
    /// # Returns
    ///
    /// - `Ok(Lookup::Found)`: At least one match; the first one wins
    /// - `Ok(Lookup::Missing)`: HTTP 200 with an empty result
    /// - `Ok(Lookup::Unauthorized)`: HTTP 403
    /// - `Err(Error)`: Transport failure, malformed body, or any other status
    async fn lookup(&self, what: &str, url: &str, query: &[(&str, &str)]) -> Result<Lookup> {
        debug!("Looking up {} via {}", what, url);

        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("{} lookup request failed: {}", what, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read {} lookup response: {}", what, e)))?;

        match status {
            StatusCode::FORBIDDEN => {
                error!(
                    "Authentication error during {} lookup. Check the token's Zone:DNS:Edit permission",
                    what
                );
                Ok(Lookup::Unauthorized)
            }
            StatusCode::OK => {
                let parsed: ListResponse = serde_json::from_str(&body).map_err(|e| {
                    Error::provider(PROVIDER, format!("Malformed {} lookup response: {}", what, e))
                })?;
                match parsed.result.unwrap_or_default().into_iter().next() {
                    Some(resource) => {
                        debug!("Found {} id {}", what, resource.id);
                        Ok(Lookup::Found(resource.id))
                    }
                    None => Ok(Lookup::Missing),
                }
            }
            other => {
                error!("{} lookup failed with HTTP {}: {}", what, other, body);
                Err(Error::http(format!("{} lookup failed with HTTP {}", what, other)))
            }
        }
    }

    async fn zone_id(&self) -> Result<Lookup> {
        let url = format!("{}/zones", self.api_base);
        self.lookup(
            "zone",
            &url,
            &[("name", self.zone_name.as_str()), ("status", "active")],
        )
        .await
    }

    async fn record_id(&self, zone_id: &str) -> Result<Lookup> {
        let url = format!("{}/zones/{}/dns_records", self.api_base, zone_id);
        self.lookup(
            "record",
            &url,
            &[("type", RECORD_TYPE), ("name", self.record_name.as_str())],
        )
        .await
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn update_record(&self, ip: &str) -> Result<UpdateResult> {
        if self.api_token.is_empty() {
            error!(
                "No Cloudflare API token configured, cannot update {}",
                self.record_name
            );
            return Ok(UpdateResult::AuthFailure);
        }

        let zone_id = match self.zone_id().await? {
            Lookup::Found(id) => id,
            Lookup::Unauthorized => return Ok(UpdateResult::AuthFailure),
            Lookup::Missing => {
                error!("Zone {} not found or not active", self.zone_name);
                return Ok(UpdateResult::ZoneNotFound);
            }
        };

        let record_id = match self.record_id(&zone_id).await? {
            Lookup::Found(id) => id,
            Lookup::Unauthorized => return Ok(UpdateResult::AuthFailure),
            Lookup::Missing => {
                error!(
                    "A record {} not found in zone {}",
                    self.record_name, self.zone_name
                );
                return Ok(UpdateResult::RecordNotFound);
            }
        };

        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.api_base, zone_id, record_id
        );
        let payload = RecordUpdate {
            record_type: RECORD_TYPE,
            name: &self.record_name,
            content: ip,
            ttl: self.ttl,
            proxied: false,
        };

        if self.dry_run {
            info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(&payload)?
            );
            return Ok(UpdateResult::Success);
        }

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("Record update request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read update response: {}", e)))?;

        match status {
            StatusCode::FORBIDDEN => {
                error!(
                    "Authentication error updating {}. Check the token's Zone:DNS:Edit permission",
                    self.record_name
                );
                Ok(UpdateResult::AuthFailure)
            }
            StatusCode::OK => {
                info!(
                    "Record updated successfully ({} -> {})",
                    self.record_name, ip
                );
                Ok(UpdateResult::Success)
            }
            other => {
                error!(
                    "Update of {} rejected with HTTP {}: {}",
                    self.record_name, other, body
                );
                Ok(UpdateResult::UpdateRejected { details: body })
            }
        }
    }

    fn record_name(&self) -> &str {
        &self.record_name
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfddns_core::config::Ttl;

    fn config(token: &str) -> ProviderConfig {
        ProviderConfig {
            api_token: token.to_string(),
            zone_name: "example.com".to_string(),
            record_name: "www.example.com".to_string(),
            ttl: Ttl::Auto,
            api_base: "https://api.cloudflare.com/client/v4/".to_string(),
            timeout_secs: 30,
            dry_run: false,
        }
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = CloudflareProvider::new(&config("secret_token_12345")).unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("CloudflareProvider"));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let provider = CloudflareProvider::new(&config("token")).unwrap();
        assert_eq!(provider.api_base, "https://api.cloudflare.com/client/v4");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config("token");
        bad.zone_name.clear();
        tokio_test::assert_err!(CloudflareProvider::new(&bad));
    }

    #[test]
    fn test_payload_shape() {
        let payload = RecordUpdate {
            record_type: RECORD_TYPE,
            name: "www.example.com",
            content: "203.0.113.5",
            ttl: 1,
            proxied: false,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "A",
                "name": "www.example.com",
                "content": "203.0.113.5",
                "ttl": 1,
                "proxied": false
            })
        );
    }

    #[test]
    fn test_null_result_reads_as_empty() {
        let parsed: ListResponse =
            serde_json::from_str(r#"{"success":false,"result":null}"#).unwrap();
        assert!(parsed.result.unwrap_or_default().is_empty());
    }
}
