//! REST endpoint handlers for the Observer server.
//!
//! All handlers read the latest merged view via the shared [`AppState`];
//! none of them triggers a collection.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/fork-choice` | Latest per-source snapshots |
//! | `GET` | `/health` | Liveness, subscriber count, present sources |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::error::ObserverError;
use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests.
    pub status: &'static str,
    /// Response time in Unix seconds.
    pub timestamp: f64,
    /// Registered push subscribers.
    pub active_connections: usize,
    /// Sources with a snapshot in the latest view.
    pub data_sources: usize,
}

// ---------------------------------------------------------------------------
// GET /api/fork-choice
// ---------------------------------------------------------------------------

/// Return the latest merged view keyed by source URL.
///
/// Responds `503` until the first collection tick completes. After that an
/// empty object is a valid answer: collection ran and nothing succeeded.
pub async fn get_fork_choice(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ObserverError> {
    let map = state.latest().ok_or(ObserverError::NoData)?;
    Ok(Json(serde_json::to_value(map.as_ref())?))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report process liveness.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: blocktree_types::unix_timestamp(),
        active_connections: state.subscriber_count(),
        data_sources: state.source_count(),
    })
}
