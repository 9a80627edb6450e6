// # cfddnsd - Cloudflare DDNS Daemon
//
// Thin integration layer over cfddns-core. All update logic lives in the
// library crates; this binary only:
//
// 1. Reads configuration from environment variables
// 2. Initializes logging and the tokio runtime
// 3. Builds the IP source, the Cloudflare provider and the state file
// 4. Runs the engine until SIGTERM or SIGINT
//
// ## Configuration
//
// - `IP_URL`: Public IP echo service (default: https://checkip.amazonaws.com/)
// - `CLOUDFLARE_TOKEN`: API token with Zone:DNS:Edit permission
// - `CLOUDFLARE_ZONE`: Zone name (default: example.com)
// - `CLOUDFLARE_RECORD`: A record to keep updated (default: www.example.com)
// - `CLOUDFLARE_DNS_TTL`: TTL in seconds, `1` or `auto` for automatic
// - `CLOUDFLARE_API_URL`: API base URL
// - `INTERVAL_MINS`: Minutes between checks (default: 5)
// - `IP_FILE`: Last-seen IP file (default: /tmp/ip)
// - `HTTP_TIMEOUT_SECS`: Per-request timeout (default: 30)
// - `LOG_LEVEL`: error, warning, info, debug, trace (default: info)
// - `DDNS_MODE`: live or dry-run (default: live)
//
// ## Example
//
// ```bash
// export CLOUDFLARE_TOKEN=your_token
// export CLOUDFLARE_ZONE=example.com
// export CLOUDFLARE_RECORD=home.example.com
// export IP_FILE=/var/lib/cfddns/ip
//
// cfddnsd
// ```

use anyhow::{Context, Result};
use cfddns_cloudflare::CloudflareProvider;
use cfddns_core::config::env;
use cfddns_core::{DdnsConfig, DdnsEngine, FileStateStore};
use cfddns_ip_http::HttpIpSource;
use std::process::ExitCode;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // Load and validate configuration from environment
    let config = match DdnsConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level.as_tracing_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("========================");
    info!(" Cloudflare DNS Updater ");
    info!("========================");
    info!("Running every {} minutes", config.engine.interval_mins);

    if !config.provider.has_token() {
        warn!(
            "{} is not set; every update will fail authentication",
            env::CLOUDFLARE_TOKEN
        );
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let engine = match build_engine(&config).await {
            Ok(engine) => engine,
            Err(e) => {
                error!("Startup failed: {:#}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(engine).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Wire the configured components into an engine
async fn build_engine(config: &DdnsConfig) -> Result<DdnsEngine> {
    let state_path = &config.state_store.path;
    let state_store = FileStateStore::new(state_path)
        .await
        .with_context(|| format!("Failed to prepare state file {}", state_path.display()))?;

    let ip_source =
        HttpIpSource::from_config(&config.ip_source).context("Failed to create IP source")?;

    let provider =
        CloudflareProvider::new(&config.provider).context("Failed to create Cloudflare provider")?;

    info!(
        "Managing {} in zone {} (state: {})",
        config.provider.record_name,
        config.provider.zone_name,
        state_path.display()
    );

    let (engine, events) = DdnsEngine::new(
        Box::new(ip_source),
        Box::new(provider),
        Box::new(state_store),
        &config.engine,
    )
    .context("Failed to create engine")?;

    // Every event is already logged through tracing
    drop(events);

    Ok(engine)
}

/// Run the engine until a shutdown signal arrives
async fn run_daemon(engine: DdnsEngine) -> Result<()> {
    let signals = ShutdownSignals::install()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        let signal = signals.recv().await;
        info!("Received shutdown signal: {}", signal);
        let _ = shutdown_tx.send(());
    });

    engine
        .run_with_shutdown(Some(shutdown_rx))
        .await
        .context("Engine stopped with an error")?;

    info!("Shutting down daemon");
    Ok(())
}

/// SIGTERM and SIGINT listeners
#[cfg(unix)]
struct ShutdownSignals {
    sigterm: Signal,
    sigint: Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
        let sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;
        Ok(Self { sigterm, sigint })
    }

    /// Wait for either signal, returning its name
    async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

/// Ctrl-C listener for non-Unix platforms
#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
        "SIGINT"
    }
}
