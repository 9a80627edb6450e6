//! Core traits for the DDNS updater
//!
//! - [`IpSource`]: Resolve the current public IP
//! - [`DnsProvider`]: Update the managed DNS record via a provider API
//! - [`StateStore`]: Persist the last-seen IP

pub mod ip_source;
pub mod dns_provider;
pub mod state_store;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, UpdateResult};
pub use state_store::StateStore;
