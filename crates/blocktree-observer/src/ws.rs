//! `WebSocket` handler for the fork choice push channel.
//!
//! Clients connect to `GET /ws`. A client first receives one
//! `initial_data` envelope (when a non-empty view exists), then one
//! `fork_choice_update` envelope per collection tick. Anything the client
//! sends is ignored apart from close frames and errors; pings are answered
//! by the WebSocket layer itself.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use blocktree_types::{Envelope, EnvelopeKind};
use tracing::{debug, warn};

use crate::registry::{ChannelSubscriber, OUTBOUND_CAPACITY, Subscriber};
use crate::state::AppState;

/// Longest a single outbound frame may take to reach the client.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Upgrade an HTTP request to a push-channel connection.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Drive one connection: initial snapshot, register, forward updates.
///
/// The registration guard is dropped on every return path, so the
/// subscriber never outlives the connection in the registry.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    if let Some(map) = state.latest().filter(|map| !map.is_empty()) {
        match Envelope::new(EnvelopeKind::InitialData, &map).to_json() {
            Ok(json) => {
                let sent = tokio::time::timeout(SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
                if !matches!(sent, Ok(Ok(()))) {
                    debug!("WebSocket client disconnected before initial data");
                    return;
                }
            }
            Err(e) => warn!("Failed to serialize initial data: {e}"),
        }
    }

    let (subscriber, mut rx) = ChannelSubscriber::new(OUTBOUND_CAPACITY);
    let subscriber: Arc<dyn Subscriber> = Arc::new(subscriber);
    let registration = state.registry.register(subscriber);
    debug!(subscriber = %registration.id(), "WebSocket client connected");

    loop {
        tokio::select! {
            // Forward a broadcast frame.
            frame = rx.recv() => {
                let Some(frame) = frame else {
                    // Pruned from the registry; nothing more will arrive.
                    break;
                };
                match tokio::time::timeout(SEND_TIMEOUT, socket.send(Message::Text(frame))).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => {
                        debug!(subscriber = %registration.id(), "WebSocket client disconnected (send failed)");
                        break;
                    }
                    Err(_elapsed) => {
                        warn!(subscriber = %registration.id(), "WebSocket send timed out, dropping client");
                        break;
                    }
                }
            }
            // Watch the client side for close or error.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(subscriber = %registration.id(), "WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(subscriber = %registration.id(), "WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Text and binary frames carry no meaning here.
                    }
                }
            }
        }
    }
}
