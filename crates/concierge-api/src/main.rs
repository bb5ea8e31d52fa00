//! Concierge server binary.
//!
//! Chat and profile API whose every profile disclosure is approved by an
//! OpenFGA-compatible authorization oracle.
//!
//! # Usage
//!
//! ```bash
//! # With config file
//! concierge --config config.yaml
//!
//! # With environment variables only
//! CONCIERGE_ORACLE__API_URL=http://localhost:8080 CONCIERGE_ORACLE__STORE_ID=01H... concierge
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use concierge_api::http::{create_router, create_router_with_observability, AppState};
use concierge_api::observability::{init_logging, init_metrics, LoggingConfig};
use concierge_server::handlers::gateway::GatewayConfig;
use concierge_server::{select_oracle, ServerConfig};
use concierge_storage::{JsonFileRecordStore, MemoryRecordStore, RecordStore};

/// Concierge - authorization-gated loyalty profile assistant
#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = if let Some(config_path) = args.config {
        ServerConfig::load(&config_path)?
    } else {
        ServerConfig::from_env()?
    };

    init_logging(LoggingConfig::from_settings(&config.logging));

    info!(version = env!("CARGO_PKG_VERSION"), "Starting concierge");

    let store = open_store(&config).await?;
    let oracle = select_oracle(&config.oracle);
    let state = AppState::with_config(
        store,
        oracle,
        GatewayConfig::default().with_check_timeout(config.oracle.timeout()),
    );

    let router = if config.metrics.enabled {
        let metrics_state = init_metrics()?;
        info!("Metrics enabled at /metrics");
        create_router_with_observability(state, metrics_state)
    } else {
        create_router(state)
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    run_http_server(router, addr).await
}

/// Opens the configured record store.
async fn open_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.storage.backend.as_str() {
        "memory" => {
            info!("Using in-memory record store with demo profiles");
            Ok(Arc::new(MemoryRecordStore::seeded()))
        }
        "json" => {
            let path = config
                .storage
                .data_path
                .as_deref()
                .context("storage.data_path is required for the json backend")?;
            let store = JsonFileRecordStore::open(path)
                .await
                .with_context(|| format!("failed to open record file {path}"))?;
            info!(path, profiles = store.len(), "Using JSON file record store");
            Ok(Arc::new(store))
        }
        other => anyhow::bail!("Unknown storage backend: {other}"),
    }
}

/// Run the HTTP server until a shutdown signal arrives.
async fn run_http_server(router: axum::Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
