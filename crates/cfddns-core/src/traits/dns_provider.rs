// # DNS Provider Trait
//
// Defines the interface for pointing the managed "A" record at a new IP.
//
// ## Implementations
//
// - Cloudflare: `cfddns-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::{DnsProvider, UpdateResult};
//
// let provider = /* DnsProvider implementation */;
// match provider.update_record("203.0.113.5").await? {
//     UpdateResult::Success => println!("updated {}", provider.record_name()),
//     other => eprintln!("update failed: {}", other),
// }
// ```

use async_trait::async_trait;
use std::fmt;

/// Outcome of a DNS update attempt that reached the provider
///
/// Transport failures, timeouts and unexpected HTTP statuses are reported as
/// `Err(Error)` instead; every variant here is a definite answer from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Record now points at the requested IP
    Success,
    /// The provider rejected the credentials (HTTP 403) or no token is set
    AuthFailure,
    /// No active zone matched the configured zone name
    ZoneNotFound,
    /// No "A" record matched the configured record name
    RecordNotFound,
    /// The provider refused the update payload
    UpdateRejected {
        /// Raw response body returned by the provider
        details: String,
    },
}

impl UpdateResult {
    pub fn is_success(&self) -> bool {
        matches!(self, UpdateResult::Success)
    }
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateResult::Success => write!(f, "record updated"),
            UpdateResult::AuthFailure => write!(f, "authentication failed, check the API token"),
            UpdateResult::ZoneNotFound => write!(f, "zone not found"),
            UpdateResult::RecordNotFound => write!(f, "record not found"),
            UpdateResult::UpdateRejected { details } => write!(f, "update rejected: {}", details),
        }
    }
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (the next IP change is the retry)
/// - ❌ Cache zone or record identifiers across calls
/// - ❌ Access the state store
/// - ❌ Spawn tasks
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Point the configured record at `ip`
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateResult)`: The provider gave a definite answer
    /// - `Err(Error)`: The call sequence was aborted by a transport error,
    ///   timeout, malformed response or unexpected status
    async fn update_record(&self, ip: &str) -> Result<UpdateResult, crate::Error>;

    /// The fully-qualified record this provider manages
    fn record_name(&self) -> &str;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
