//! Change detection against the persisted last-seen IP
//!
//! Comparison is plain text equality. `203.0.113.5` and ` 203.0.113.5` are
//! different addresses here; canonicalisation is the resolver's business.
//!
//! The new IP is committed *before* the DNS update runs. If the update then
//! fails, the same IP will not be retried until the address changes again.

use tracing::{debug, info};

use crate::error::Result;
use crate::events::{EngineEvent, EventSink, UNKNOWN_IP};
use crate::traits::StateStore;

/// Detects IP changes and records the latest observed address
pub struct ChangeDetector {
    store: Box<dyn StateStore>,
    events: EventSink,
}

impl ChangeDetector {
    pub fn new(store: Box<dyn StateStore>, events: EventSink) -> Self {
        Self { store, events }
    }

    /// Compare `candidate` with the persisted IP, storing it if different
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: The IP changed and the new value has been persisted
    /// - `Ok(false)`: The IP is unchanged; nothing was written
    /// - `Err(Error)`: The store could not be read or written
    pub async fn check_and_update(&self, candidate: &str) -> Result<bool> {
        let previous = self.store.load().await?;

        if previous.as_deref() == Some(candidate) {
            debug!("No IP change ({})", candidate);
            self.events.emit(EngineEvent::IpUnchanged {
                ip: candidate.to_string(),
            });
            return Ok(false);
        }

        self.store.store(candidate).await?;

        info!(
            "IP updated ({} -> {})",
            previous.as_deref().unwrap_or(UNKNOWN_IP),
            candidate
        );
        self.events.emit(EngineEvent::IpChanged {
            previous,
            current: candidate.to_string(),
        });

        Ok(true)
    }

    /// Flush the underlying store
    pub async fn flush(&self) -> Result<()> {
        self.store.flush().await
    }
}
