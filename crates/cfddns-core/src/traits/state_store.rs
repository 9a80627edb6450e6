// # State Store Trait
//
// Defines the interface for the persisted last-seen IP.
//
// ## Purpose
//
// The store holds exactly one value: the last IP address for which a DNS
// update was attempted. It is written as soon as a change is detected,
// before the provider confirms anything.
//
// ## Implementations
//
// - File-based: one-line text file (`FileStateStore`)
// - In-memory: `MemoryStateStore`

use async_trait::async_trait;

/// Trait for state store implementations
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform I/O for persistent storage
///
/// ## Forbidden Capabilities
/// - ❌ Implement business logic (owned by `ChangeDetector`)
/// - ❌ Perform DNS updates (owned by `DnsProvider`)
///
/// The updater assumes a single writer. Running two instances against the
/// same store needs external locking.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the last-seen IP
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: The stored IP, whitespace-trimmed
    /// - `Ok(None)`: Nothing stored yet, or the stored value is blank
    /// - `Err(Error)`: Storage error
    async fn load(&self) -> Result<Option<String>, crate::Error>;

    /// Replace the last-seen IP
    async fn store(&self, ip: &str) -> Result<(), crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}
