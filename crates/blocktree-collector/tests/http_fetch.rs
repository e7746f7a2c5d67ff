//! Integration tests for [`HttpFetcher`] against local fake beacon nodes.
//!
//! Each test binds an Axum server on `127.0.0.1:0` that mimics one
//! upstream node's fork choice debug endpoint.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use blocktree_collector::{CollectorConfig, FetchError, FetchSource, HttpFetcher, parse};
use blocktree_types::SourceId;
use serde_json::json;
use tokio::net::TcpListener;

const PATH: &str = "/eth/v1/debug/fork_choice";

async fn spawn_node(router: Router) -> SourceId {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    SourceId::new(&format!("http://{addr}"))
}

fn fetcher(timeout: Duration) -> HttpFetcher {
    HttpFetcher::new(&CollectorConfig {
        fetch_timeout: timeout,
        ..CollectorConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn fetches_and_parses_fork_choice() {
    let source = spawn_node(Router::new().route(
        PATH,
        get(|| async {
            axum::Json(json!({
                "justified_checkpoint": {"epoch": "1", "root": "0x01"},
                "finalized_checkpoint": {"epoch": "0", "root": "0x00"},
                "fork_choice_nodes": [
                    {"slot": "1", "block_root": "0xaa", "parent_root": "0x00"},
                    {"slot": "2", "block_root": "0xbb", "parent_root": "0xaa"}
                ],
                "extra_data": {"head_root": "0xbb"}
            }))
        }),
    ))
    .await;

    let raw = fetcher(Duration::from_secs(2)).fetch(&source).await.unwrap();
    let snapshot = parse(&raw, 1.0);

    assert_eq!(snapshot.node_count(), 2);
    assert_eq!(snapshot.head_root, "0xbb");
    assert_eq!(snapshot.nodes[1].parent_root, "0xaa");
}

#[tokio::test]
async fn non_success_status_is_status_error() {
    let source = spawn_node(Router::new().route(
        PATH,
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "syncing").into_response() }),
    ))
    .await;

    let err = fetcher(Duration::from_secs(2)).fetch(&source).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503, .. }), "{err}");
    assert!(err.endpoint().ends_with(PATH));
}

#[tokio::test]
async fn unknown_path_is_status_error() {
    let source = spawn_node(Router::new()).await;

    let err = fetcher(Duration::from_secs(2)).fetch(&source).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }), "{err}");
}

#[tokio::test]
async fn malformed_body_is_body_error() {
    let source = spawn_node(Router::new().route(PATH, get(|| async { "{not json" }))).await;

    let err = fetcher(Duration::from_secs(2)).fetch(&source).await.unwrap_err();
    assert!(matches!(err, FetchError::Body { .. }), "{err}");
}

#[tokio::test]
async fn slow_node_is_timeout_error() {
    let source = spawn_node(Router::new().route(
        PATH,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            axum::Json(json!({}))
        }),
    ))
    .await;

    let err = fetcher(Duration::from_millis(200)).fetch(&source).await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout { .. }), "{err}");
}

#[tokio::test]
async fn refused_connection_is_request_error() {
    // Bind then drop to obtain a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = SourceId::new(&format!("http://{addr}"));
    let err = fetcher(Duration::from_secs(2)).fetch(&source).await.unwrap_err();
    assert!(matches!(err, FetchError::Request { .. }), "{err}");
}
