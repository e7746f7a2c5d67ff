//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use blocktree_observer::router::build_router;
use blocktree_observer::state::AppState;
use blocktree_types::{BlockNode, ForkChoiceMap, Snapshot, SourceId};
use serde_json::Value;
use tower::ServiceExt;

fn snapshot_with_nodes(count: usize) -> Snapshot {
    Snapshot {
        head_root: String::from("0xhead"),
        nodes: (0..count)
            .map(|i| BlockNode {
                slot: i.to_string(),
                ..BlockNode::default()
            })
            .collect(),
        timestamp: 1_700_000_000.5,
        ..Snapshot::default()
    }
}

fn two_source_map() -> ForkChoiceMap {
    [
        (SourceId::new("http://beacon-1:7777"), snapshot_with_nodes(5)),
        (SourceId::new("http://beacon-3:7777"), snapshot_with_nodes(0)),
    ]
    .into_iter()
    .collect()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: Arc<AppState>, path: &str) -> axum::response::Response {
    build_router(state)
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Create a throwaway static root with a couple of files.
fn static_root() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("blocktree-static-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<!DOCTYPE html><title>blocktree</title>").unwrap();
    std::fs::write(dir.join("app.js"), "console.log('blocktree');").unwrap();
    dir
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_fork_choice_before_first_tick_is_503() {
    let response = get(Arc::new(AppState::new()), "/api/fork-choice").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_fork_choice_after_empty_tick_is_empty_object() {
    let state = Arc::new(AppState::new());
    state.update(ForkChoiceMap::new()).unwrap();

    let response = get(state, "/api/fork-choice").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, serde_json::json!({}));
}

#[tokio::test]
async fn test_fork_choice_returns_each_present_source() {
    let state = Arc::new(AppState::new());
    state.update(two_source_map()).unwrap();

    let response = get(state, "/api/fork-choice").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let sources = json.as_object().unwrap();
    assert_eq!(sources.len(), 2);

    let first = &json["http://beacon-1:7777"];
    assert_eq!(first["nodes"].as_array().unwrap().len(), 5);
    assert_eq!(first["head_root"], "0xhead");
    assert!(first["justified_checkpoint"].is_object());
    assert!(first["finalized_checkpoint"].is_object());
    assert_eq!(first["timestamp"], 1_700_000_000.5);
    assert_eq!(first["nodes"][0]["validity"], "unknown");

    assert_eq!(json["http://beacon-3:7777"]["nodes"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_fork_choice_reflects_latest_tick_only() {
    let state = Arc::new(AppState::new());
    state.update(two_source_map()).unwrap();
    state
        .update(
            [(SourceId::new("http://beacon-3:7777"), snapshot_with_nodes(1))]
                .into_iter()
                .collect(),
        )
        .unwrap();

    let json = body_to_json(get(state, "/api/fork-choice").await.into_body()).await;
    let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["http://beacon-3:7777"]);
}

#[tokio::test]
async fn test_health_reports_counts() {
    let state = Arc::new(AppState::new());
    state.update(two_source_map()).unwrap();

    let response = get(state, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["active_connections"], 0);
    assert_eq!(json["data_sources"], 2);
    assert!(json["timestamp"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_health_before_first_tick() {
    let json = body_to_json(get(Arc::new(AppState::new()), "/health").await.into_body()).await;
    assert_eq!(json["data_sources"], 0);
}

#[tokio::test]
async fn test_root_serves_index_html() {
    let state = Arc::new(AppState::with_static_dir(static_root()));

    let response = get(state, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_static_file_content_type_from_extension() {
    let state = Arc::new(AppState::with_static_dir(static_root()));

    let response = get(state, "/app.js").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("javascript"));
}

#[tokio::test]
async fn test_missing_static_file_is_404() {
    let state = Arc::new(AppState::with_static_dir(static_root()));

    let response = get(state, "/missing.css").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
