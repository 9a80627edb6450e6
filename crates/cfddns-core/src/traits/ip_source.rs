// # IP Source Trait
//
// Defines the interface for resolving the caller's current public IP.
//
// ## Implementations
//
// - HTTP plain-text endpoint: `cfddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> cfddns_core::Result<()> {
//     let source = /* IpSource implementation */;
//     let ip = source.resolve().await?;
//     println!("Current IP: {}", ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for public IP resolvers
///
/// # Trust Level: Semi-Trusted
///
/// IP sources are **observers**, not decision-makers.
///
/// ## Allowed Capabilities
/// - ✅ One outbound request per `resolve()` call
///
/// ## Forbidden Capabilities
/// - ❌ Retry within a call (the next scheduled tick is the retry)
/// - ❌ Spawn polling tasks (scheduling is owned by `DdnsEngine`)
/// - ❌ Touch the state store or decide whether DNS needs updating
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public IP address
    ///
    /// The address is returned as text exactly as the source reported it,
    /// minus surrounding whitespace. No format validation is applied.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The current IP address
    /// - `Err(Error::IpSource)`: Transport failure, non-2xx status or empty body
    async fn resolve(&self) -> Result<String, crate::Error>;

    /// Name of the source (for logging)
    fn source_name(&self) -> &str;
}
