//! `envgauge-exporter` -- environment sensor Prometheus exporter.
//!
//! Polls per-sensor JSON data files and serves their temperature and
//! humidity as gauges on `GET /metrics`.
//!
//! # Environment variables
//!
//! | Variable           | Required | Default       | Description                          |
//! |--------------------|----------|---------------|--------------------------------------|
//! | `CONFIG_FILE_PATH` | no       | `config.yaml` | YAML file listing sensors and server |
//! | `SERVER_ADDR`      | no       | --            | Overrides `server.addr` from the file |
//! | `RUST_LOG`         | no       | see below     | `tracing` filter directives          |
//! | `LOG_FORMAT`       | no       | `text`        | `json` for structured log lines      |

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use envgauge_exporter::config::ExporterConfig;
use envgauge_exporter::poller::{join_pollers, spawn_pollers};
use envgauge_exporter::registry::GaugeRegistry;
use envgauge_exporter::router::build_app_router;
use envgauge_exporter::state::AppState;

const DEFAULT_LOG_FILTER: &str = "envgauge_exporter=info,envgauge_core=info,tower_http=info";

/// How long to wait for pollers after the server has stopped.
const POLLER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %format!("{e:#}"), "Exporter failed to start");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() -> anyhow::Result<()> {
    // --- Configuration ---
    let config = ExporterConfig::from_env().context("Failed to load configuration")?;
    let addr = config.server.socket_addr()?;
    let specs = config.sensor_specs();
    tracing::info!(%addr, sensors = specs.len(), "Loaded exporter configuration");

    if specs.is_empty() {
        tracing::warn!("No sensors configured -- /metrics will be empty");
    }

    // --- Gauges ---
    let registry = Arc::new(GaugeRegistry::build(&specs).context("Failed to register gauges")?);

    // --- Pollers ---
    let cancel = CancellationToken::new();
    let pollers = spawn_pollers(&registry, &specs, &cancel)?;
    tracing::info!(count = pollers.len(), "Sensor pollers started");

    // --- Router ---
    let state = AppState {
        registry: Arc::clone(&registry),
    };
    let app = build_app_router(state, &config.server);

    // --- Start server ---
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(%addr, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped, stopping sensor pollers");
    cancel.cancel();
    let unclean = join_pollers(pollers, POLLER_SHUTDOWN_TIMEOUT).await;
    if unclean > 0 {
        tracing::warn!(count = unclean, "Some sensor pollers did not stop cleanly");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
