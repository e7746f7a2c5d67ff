//! Axum router construction for the Observer API.
//!
//! Assembles the push channel, REST endpoints, and static assets into a
//! single [`Router`] with CORS enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::assets;
use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /ws` -- `WebSocket` push channel
/// - `GET /api/fork-choice` -- latest per-source snapshots
/// - `GET /health` -- liveness probe
/// - `GET /` and `GET /{path}` -- static dashboard files
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = assets::static_files(&state.static_dir);

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_handler))
        // REST API
        .route("/api/fork-choice", get(handlers::get_fork_choice))
        .route("/health", get(handlers::health))
        // Dashboard
        .fallback_service(static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
