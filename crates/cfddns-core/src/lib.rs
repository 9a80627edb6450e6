// # cfddns-core
//
// Core library for the polling Cloudflare DDNS updater.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for resolving the current public IP
// - **StateStore**: Trait for the persisted last-seen IP
// - **ChangeDetector**: Compares a resolved IP with the persisted one
// - **DnsProvider**: Trait for updating the DNS record via a provider API
// - **DdnsEngine**: Scheduler loop tying the above together
//
// ## Design Principles
//
// 1. **Explicit configuration**: Components receive config values; nothing reads the environment
// 2. **Sequential ticks**: One check-and-maybe-update pass at a time, never overlapping
// 3. **Library-First**: The daemon is a thin wrapper over this crate
// 4. **Injectable observability**: Every logged outcome is also a typed event

pub mod traits;
pub mod engine;
pub mod detector;
pub mod events;
pub mod config;
pub mod error;
pub mod state;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, StateStore, UpdateResult};
pub use engine::{DdnsEngine, TickOutcome};
pub use detector::ChangeDetector;
pub use events::{EngineEvent, EventSink};
pub use config::{DdnsConfig, EngineConfig, IpSourceConfig, LogLevel, ProviderConfig, StateStoreConfig, Ttl};
pub use error::{Error, Result};
pub use state::{MemoryStateStore, FileStateStore};
