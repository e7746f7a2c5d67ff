//! Fork choice visualizer binary.
//!
//! Polls a fixed set of beacon nodes for their fork choice view, keeps the
//! latest merged view in memory, and serves it to dashboards over HTTP and
//! a `WebSocket` push channel.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from the environment
//! 3. Bind and spawn the Observer API server
//! 4. Run the collection loop for the life of the process

mod config;
mod error;

use std::sync::Arc;

use blocktree_collector::{Collector, CollectorConfig, HttpFetcher};
use blocktree_observer::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::error::AppError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the listening socket
/// cannot be bound.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("blocktree-server starting");

    // 2. Load configuration.
    let settings = Settings::from_env()?;
    let collector_config = CollectorConfig::default();
    info!(
        sources = settings.sources.len(),
        host = settings.server.host,
        port = settings.server.port,
        static_dir = %settings.static_dir.display(),
        poll_interval_ms = collector_config.poll_interval.as_millis(),
        fetch_timeout_ms = collector_config.fetch_timeout.as_millis(),
        "Configuration loaded"
    );
    for source in &settings.sources {
        info!(source = %source, "Polling source");
    }

    // 3. Start Observer API server.
    let state = Arc::new(AppState::with_static_dir(settings.static_dir.clone()));
    let (addr, _observer_handle) =
        blocktree_observer::spawn_observer(&settings.server, Arc::clone(&state)).await?;
    info!(%addr, "Observer API server started");

    // 4. Run the collection loop.
    let fetcher = HttpFetcher::new(&collector_config)?;
    let collector = Collector::new(settings.sources, fetcher, collector_config);
    collector.run(state.as_ref()).await;

    Ok(())
}
