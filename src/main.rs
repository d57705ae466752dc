// Main entry point - Wiring the monitor session and the snapshot feed
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::application::monitor_session::MonitorSession;
use crate::infrastructure::config::load_monitor_config;
use crate::infrastructure::csv_log::CsvSignalLog;
use crate::infrastructure::router_client::RouterClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, latest_snapshot, stream_snapshots};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("signal_monitor=info")),
        )
        .init();

    // Load configuration
    let config = load_monitor_config()?;

    // Create the log before the first reading arrives
    let log = CsvSignalLog::new(&config.log.path);
    log.ensure_initialized()?;
    tracing::info!("Logging readings to {}", log.path().display());

    // Create acquisition client (infrastructure layer)
    let client = Arc::new(RouterClient::new(Duration::from_secs(
        config.device.timeout_secs,
    ))?);

    // Create session (application layer)
    let mut session = MonitorSession::new(client, log);
    let state = Arc::new(AppState {
        snapshots: session.subscribe(),
    });

    // Connect; bad credentials leave the session idle but the feed still runs
    if let Err(e) = session
        .connect(&config.device.host, &config.device.password)
        .await
    {
        tracing::error!("Not connecting: {}", e);
    }
    tokio::spawn(session.run());

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/snapshot", get(latest_snapshot))
        .route("/snapshots/stream", get(stream_snapshots))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting signal-monitor feed on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
