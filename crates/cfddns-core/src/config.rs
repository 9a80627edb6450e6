//! Configuration types for the DDNS updater
//!
//! The configuration is read once at startup (normally from the process
//! environment) and then handed to each component by value or reference.
//! Nothing below the daemon reads ambient state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable names
pub mod env {
    pub const IP_URL: &str = "IP_URL";
    pub const CLOUDFLARE_TOKEN: &str = "CLOUDFLARE_TOKEN";
    pub const CLOUDFLARE_ZONE: &str = "CLOUDFLARE_ZONE";
    pub const CLOUDFLARE_RECORD: &str = "CLOUDFLARE_RECORD";
    pub const CLOUDFLARE_DNS_TTL: &str = "CLOUDFLARE_DNS_TTL";
    pub const CLOUDFLARE_API_URL: &str = "CLOUDFLARE_API_URL";
    pub const INTERVAL_MINS: &str = "INTERVAL_MINS";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const IP_FILE: &str = "IP_FILE";
    pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
    pub const DDNS_MODE: &str = "DDNS_MODE";
}

pub const DEFAULT_IP_URL: &str = "https://checkip.amazonaws.com/";
pub const DEFAULT_ZONE: &str = "example.com";
pub const DEFAULT_RECORD: &str = "www.example.com";
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_STATE_FILE: &str = "/tmp/ip";
pub const DEFAULT_INTERVAL_MINS: u64 = 5;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Largest interval whose length in seconds still fits in a u64
pub const MAX_INTERVAL_MINS: u64 = u64::MAX / 60;

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Public IP resolver configuration
    pub ip_source: IpSourceConfig,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Persisted IP state configuration
    pub state_store: StateStoreConfig,

    /// Scheduler settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Log verbosity
    #[serde(default)]
    pub log_level: LogLevel,
}

impl DdnsConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Unset and empty variables fall back to their defaults. Values that are
    /// present but unparseable are rejected rather than silently replaced.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs = match get(env::HTTP_TIMEOUT_SECS) {
            Some(raw) => parse_number(env::HTTP_TIMEOUT_SECS, &raw)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let ttl = match get(env::CLOUDFLARE_DNS_TTL) {
            Some(raw) => Ttl::parse(&raw)?,
            None => Ttl::Auto,
        };

        let interval_mins = match get(env::INTERVAL_MINS) {
            Some(raw) => parse_number(env::INTERVAL_MINS, &raw)?,
            None => DEFAULT_INTERVAL_MINS,
        };

        let log_level = match get(env::LOG_LEVEL) {
            Some(raw) => raw.parse()?,
            None => LogLevel::default(),
        };

        let dry_run = match get(env::DDNS_MODE).as_deref().map(str::to_lowercase) {
            None => false,
            Some(mode) if mode == "live" => false,
            Some(mode) if mode == "dry-run" => true,
            Some(other) => {
                return Err(Error::config(format!(
                    "{} '{}' is not valid. Valid modes: live, dry-run",
                    env::DDNS_MODE,
                    other
                )));
            }
        };

        let config = Self {
            ip_source: IpSourceConfig {
                url: get(env::IP_URL).unwrap_or_else(|| DEFAULT_IP_URL.to_string()),
                timeout_secs,
            },
            provider: ProviderConfig {
                api_token: lookup(env::CLOUDFLARE_TOKEN)
                    .map(|t| t.trim().to_string())
                    .unwrap_or_default(),
                zone_name: get(env::CLOUDFLARE_ZONE).unwrap_or_else(|| DEFAULT_ZONE.to_string()),
                record_name: get(env::CLOUDFLARE_RECORD)
                    .unwrap_or_else(|| DEFAULT_RECORD.to_string()),
                ttl,
                api_base: get(env::CLOUDFLARE_API_URL)
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                timeout_secs,
                dry_run,
            },
            state_store: StateStoreConfig {
                path: get(env::IP_FILE)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            },
            engine: EngineConfig {
                interval_mins,
                event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            },
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// A missing API token is deliberately not an error here: the updater
    /// still runs and reports auth failures for every attempted update.
    pub fn validate(&self) -> Result<()> {
        self.ip_source.validate()?;
        self.provider.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::config(format!("{} must be a whole number. Got: {}", key, raw)))
}

fn validate_url(key: &str, url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(Error::config(format!("{} cannot be empty", key)));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            key, url
        )));
    }
    Ok(())
}

/// Public IP resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpSourceConfig {
    /// Endpoint returning the caller's address as plain text
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl IpSourceConfig {
    pub fn validate(&self) -> Result<()> {
        validate_url(env::IP_URL, &self.url)?;
        if self.timeout_secs == 0 {
            return Err(Error::config("HTTP timeout must be > 0"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Cloudflare provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Bearer token with Zone:DNS:Edit permission
    pub api_token: String,

    /// Zone name, e.g. "example.com"
    pub zone_name: String,

    /// Fully-qualified record name, e.g. "www.example.com"
    pub record_name: String,

    /// TTL written with every update
    pub ttl: Ttl,

    /// API base URL, without a trailing slash
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Perform lookups but never send the update
    #[serde(default)]
    pub dry_run: bool,
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.zone_name.is_empty() {
            return Err(Error::config("Cloudflare zone name cannot be empty"));
        }
        if self.record_name.is_empty() {
            return Err(Error::config("Cloudflare record name cannot be empty"));
        }
        validate_url(env::CLOUDFLARE_API_URL, &self.api_base)?;
        if self.timeout_secs == 0 {
            return Err(Error::config("HTTP timeout must be > 0"));
        }
        if let Ttl::Seconds(0) = self.ttl {
            return Err(Error::config("TTL must be at least 1 second"));
        }
        Ok(())
    }

    pub fn has_token(&self) -> bool {
        !self.api_token.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Keeps the token out of logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"<REDACTED>")
            .field("zone_name", &self.zone_name)
            .field("record_name", &self.record_name)
            .field("ttl", &self.ttl)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// DNS record TTL
///
/// Cloudflare encodes "automatic" as a TTL of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ttl {
    #[default]
    Auto,
    Seconds(u32),
}

impl Ttl {
    /// Parse `auto` or a whole number of seconds (`1` means auto)
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.eq_ignore_ascii_case("auto") {
            return Ok(Ttl::Auto);
        }
        match raw.parse::<u32>() {
            Ok(0) | Err(_) => Err(Error::config(format!(
                "{} must be 'auto' or a whole number of seconds >= 1. Got: {}",
                env::CLOUDFLARE_DNS_TTL,
                raw
            ))),
            Ok(1) => Ok(Ttl::Auto),
            Ok(secs) => Ok(Ttl::Seconds(secs)),
        }
    }

    /// The value sent in the `ttl` field of the API payload
    pub fn as_api_value(self) -> u32 {
        match self {
            Ttl::Auto => 1,
            Ttl::Seconds(secs) => secs,
        }
    }
}

/// Persisted IP state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateStoreConfig {
    /// One-line file holding the last-seen IP
    pub path: PathBuf,
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minutes to sleep between ticks
    #[serde(default = "default_interval_mins")]
    pub interval_mins: u64,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped with a warning log rather than
    /// blocking the tick.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interval_mins == 0 {
            return Err(Error::config(format!(
                "{} must be at least 1 minute",
                env::INTERVAL_MINS
            )));
        }
        if self.interval_mins > MAX_INTERVAL_MINS {
            return Err(Error::config(format!(
                "{} must be at most {} minutes. Got: {}",
                env::INTERVAL_MINS,
                MAX_INTERVAL_MINS,
                self.interval_mins
            )));
        }
        if self.event_channel_capacity == 0 {
            return Err(Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_mins.saturating_mul(60))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_mins: default_interval_mins(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interval_mins() -> u64 {
    DEFAULT_INTERVAL_MINS
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warning,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(Error::config(format!(
                "{} '{}' is not valid. Valid levels: warning, info, debug",
                env::LOG_LEVEL,
                s
            ))),
        }
    }
}
