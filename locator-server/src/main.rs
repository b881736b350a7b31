// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Australian Address Locator
//
//  API:     axum REST + GraphQL on a tokio multi-thread runtime
//  Lookup:  Australia Post postcode search
//  Logs:    Elasticsearch (or in-memory) interaction log
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::Parser;
use locator_api::AppState;
use locator_core::config::LogBackendKind;
use locator_core::LocatorConfig;
use locator_lookup::{AddressLookup, AusPostClient};
use locator_store::{LogService, LogStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "locator", version, about = "Australian address verification and location search")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/locator.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Address locator starting");

    // ── Config ──
    if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
    } else {
        info!(path = %cli.config.display(), "No config file found, using defaults and environment");
    }
    let config = LocatorConfig::load(&cli.config)?;

    // ── Address lookup ──
    if config.auspost.api_key.is_empty() {
        warn!("No Australia Post API key configured, lookups will be rejected upstream");
    }
    let client = AusPostClient::new(&config.auspost)?;
    let lookup = AddressLookup::new(Arc::new(client));

    // ── Interaction logs ──
    let store = Arc::new(LogStore::new(config.logging.clone()));
    if config.logging.backend != LogBackendKind::None {
        // Create the index up front; requests retry until it succeeds.
        store.ensure_ready().await;
    }
    let logs = LogService::new(store);

    // ── API ──
    let state = Arc::new(AppState::new(lookup, logs));
    locator_api::start_server(config.server.clone(), state, shutdown_signal()).await?;

    info!("Address locator stopped");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping...");
}
