//! Observer server startup helper for embedding in the collector binary.
//!
//! Provides [`spawn_observer`] which binds the listening socket eagerly and
//! then serves the Observer HTTP + `WebSocket` API on a background Tokio
//! task, so the collection loop can run on the caller's task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use blocktree_observer::{spawn_observer, AppState, ServerConfig};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new());
//! let (addr, handle) = spawn_observer(&ServerConfig::default(), Arc::clone(&state)).await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind the Observer server and serve it on a background Tokio task.
///
/// Returns the bound address (useful when `port` is `0`) and the task
/// handle. A serve error after startup is logged by the task.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the socket cannot be bound.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<(SocketAddr, JoinHandle<()>), StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%addr, "Observer server spawned on background task");

    Ok((addr, handle))
}
