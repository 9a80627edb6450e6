//! Core DDNS engine
//!
//! The DdnsEngine is the scheduler loop. Each tick it:
//! - Resolves the current public IP via IpSource
//! - Runs change detection against the StateStore
//! - Updates the DNS record via DnsProvider when the IP changed
//!
//! ## Architecture
//!
//! ```text
//!                   ┌──────────────┐
//!      ┌────────────│  DdnsEngine  │────────────┐
//!      │            └──────────────┘            │
//!      │ resolve()          │ check_and_update  │ update_record()
//!      ▼                    ▼                   ▼
//! ┌─────────────┐   ┌────────────────┐   ┌─────────────┐
//! │  IpSource   │   │ ChangeDetector │   │ DnsProvider │
//! └─────────────┘   │  (StateStore)  │   └─────────────┘
//!                   └────────────────┘
//! ```
//!
//! ## Tick Flow
//!
//! 1. Resolve the public IP
//! 2. Compare with the persisted IP; persist it if different
//! 3. If changed, call DnsProvider::update_record()
//! 4. Emit events for monitoring/logging
//!
//! The first tick runs immediately. The loop then sleeps for the configured
//! interval; the sleep races the shutdown signal, so shutdown is observed at
//! the latest when the sleep would have ended. A tick in flight is always
//! allowed to finish.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::config::EngineConfig;
use crate::detector::ChangeDetector;
use crate::error::Result;
use crate::events::{EngineEvent, EventSink};
use crate::traits::{DnsProvider, IpSource, StateStore, UpdateResult};

/// Result of a tick that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The IP matched the persisted value; the provider was not called
    Unchanged,
    /// The IP changed and the provider answered
    Updated(UpdateResult),
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`] or [`DdnsEngine::run_with_shutdown()`]
/// 3. Engine ticks until a shutdown signal is received
/// 4. State is flushed and the call returns
///
/// ## Threading
///
/// All work happens on the task that calls `run`. Ticks never overlap.
pub struct DdnsEngine {
    /// Public IP resolver
    ip_source: Box<dyn IpSource>,

    /// DNS provider for updating the record
    provider: Box<dyn DnsProvider>,

    /// Change detection over the persisted IP
    detector: ChangeDetector,

    /// Sleep between ticks
    interval: Duration,

    /// Event sender for external monitoring
    events: EventSink,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `state_store`: State store implementation
    /// - `config`: Scheduler configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events.
    /// Dropping the receiver is fine; events are then discarded.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
        config: &EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (events, rx) = EventSink::channel(config.event_channel_capacity);

        let engine = Self {
            ip_source,
            provider,
            detector: ChangeDetector::new(state_store, events.clone()),
            interval: config.interval(),
            events,
        };

        Ok((engine, rx))
    }

    /// Interval between ticks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the engine until Ctrl-C
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: State could not be flushed on exit
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the engine until `shutdown_rx` fires (or its sender is dropped)
    ///
    /// With `None` this behaves like [`DdnsEngine::run()`].
    pub async fn run_with_shutdown(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        let mut shutdown: Pin<Box<dyn Future<Output = ()> + Send>> = match shutdown_rx {
            Some(rx) => Box::pin(async move {
                let _ = rx.await;
            }),
            None => Box::pin(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for Ctrl-C, running until killed: {}", e);
                    std::future::pending::<()>().await;
                }
            }),
        };

        info!(
            "Engine started for {} via {} (every {}s)",
            self.provider.record_name(),
            self.provider.provider_name(),
            self.interval.as_secs()
        );
        self.emit_event(EngineEvent::Started {
            interval: self.interval,
        });

        loop {
            self.run_tick().await;

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }

                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        // Flush state before exiting
        self.detector.flush().await?;
        info!("State flushed, engine stopped");

        Ok(())
    }

    /// Run one tick, absorbing any error so the loop keeps its schedule
    async fn run_tick(&self) {
        if let Err(e) = self.tick().await {
            if e.is_transient() {
                error!("Tick failed, retrying in {}s: {}", self.interval.as_secs(), e);
            } else {
                error!("Tick failed: {}", e);
            }
            self.emit_event(EngineEvent::TickFailed {
                error: e.to_string(),
            });
        }
    }

    /// Perform a single check-and-maybe-update pass
    ///
    /// Public so embedders can drive their own schedule.
    pub async fn tick(&self) -> Result<TickOutcome> {
        debug!("Acquiring current IP from {}", self.ip_source.source_name());
        let ip = match self.ip_source.resolve().await {
            Ok(ip) => ip,
            Err(e) => {
                self.emit_event(EngineEvent::IpResolutionFailed {
                    error: e.to_string(),
                });
                return Err(e);
            }
        };
        debug!("Current IP: {}", ip);

        if !self.detector.check_and_update(&ip).await? {
            return Ok(TickOutcome::Unchanged);
        }

        let record_name = self.provider.record_name().to_string();
        let result = self.provider.update_record(&ip).await?;

        match &result {
            UpdateResult::Success => {
                debug!("Successfully updated record {}", record_name);
                self.emit_event(EngineEvent::UpdateSucceeded {
                    record_name,
                    ip,
                });
            }
            failure => {
                // The detector already committed this IP
                error!(
                    "Update of {} to {} did not succeed ({}); it will not be retried until the IP changes",
                    record_name, ip, failure
                );
                self.emit_event(EngineEvent::UpdateFailed {
                    record_name,
                    result: result.clone(),
                });
            }
        }

        Ok(TickOutcome::Updated(result))
    }

    fn emit_event(&self, event: EngineEvent) {
        self.events.emit(event);
    }
}
