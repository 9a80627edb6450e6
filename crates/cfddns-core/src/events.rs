//! Engine events
//!
//! Every outcome that is logged through `tracing` is also emitted as a typed
//! [`EngineEvent`] on a bounded channel. Embedders and tests consume the
//! receiver returned by [`DdnsEngine::new`](crate::DdnsEngine::new) instead
//! of scraping log output.

use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use crate::traits::UpdateResult;

/// Placeholder shown for an unknown previous IP
pub const UNKNOWN_IP: &str = "N/A";

/// Events emitted by the engine and its components
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        interval: Duration,
    },

    /// The public IP could not be resolved this tick
    IpResolutionFailed {
        error: String,
    },

    /// Resolved IP differs from the persisted one
    IpChanged {
        previous: Option<String>,
        current: String,
    },

    /// Resolved IP matches the persisted one
    IpUnchanged {
        ip: String,
    },

    /// DNS record now points at the new IP
    UpdateSucceeded {
        record_name: String,
        ip: String,
    },

    /// Provider answered with a failure outcome
    UpdateFailed {
        record_name: String,
        result: UpdateResult,
    },

    /// A tick was aborted by an error
    TickFailed {
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::Started { interval } => {
                write!(f, "started, checking every {}s", interval.as_secs())
            }
            EngineEvent::IpResolutionFailed { error } => {
                write!(f, "IP resolution failed: {}", error)
            }
            EngineEvent::IpChanged { previous, current } => write!(
                f,
                "{} -> {}",
                previous.as_deref().unwrap_or(UNKNOWN_IP),
                current
            ),
            EngineEvent::IpUnchanged { ip } => write!(f, "no IP change ({})", ip),
            EngineEvent::UpdateSucceeded { record_name, ip } => {
                write!(f, "{} -> {}", record_name, ip)
            }
            EngineEvent::UpdateFailed {
                record_name,
                result,
            } => write!(f, "{}: {}", record_name, result),
            EngineEvent::TickFailed { error } => write!(f, "tick failed: {}", error),
            EngineEvent::Stopped { reason } => write!(f, "stopped: {}", reason),
        }
    }
}

/// Sending half of the engine event channel
///
/// Cheap to clone. Emitting never blocks: a full channel drops the event
/// with a warning, a closed channel drops it silently.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl EventSink {
    /// Create a sink and the matching receiver
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: EngineEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_changed_renders_unknown_previous() {
        let event = EngineEvent::IpChanged {
            previous: None,
            current: "198.51.100.9".to_string(),
        };
        assert_eq!(event.to_string(), "N/A -> 198.51.100.9");

        let event = EngineEvent::IpChanged {
            previous: Some("1.2.3.4".to_string()),
            current: "1.2.3.5".to_string(),
        };
        assert_eq!(event.to_string(), "1.2.3.4 -> 1.2.3.5");
    }

    #[tokio::test]
    async fn test_full_channel_drops_without_blocking() {
        let (sink, mut rx) = EventSink::channel(1);
        sink.emit(EngineEvent::IpUnchanged { ip: "1.1.1.1".into() });
        sink.emit(EngineEvent::IpUnchanged { ip: "2.2.2.2".into() });

        assert_eq!(
            rx.recv().await,
            Some(EngineEvent::IpUnchanged { ip: "1.1.1.1".into() })
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (sink, rx) = EventSink::channel(4);
        drop(rx);
        sink.emit(EngineEvent::Stopped {
            reason: "test".into(),
        });
    }
}
