//! Error types for the Observer API server.
//!
//! [`ObserverError`] unifies handler failure modes into a single enum that
//! converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// No collection tick has completed yet.
    #[error("no fork choice data collected yet")]
    NoData,

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NoData => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Failure to publish a merged view to subscribers.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The update envelope could not be serialized.
    #[error("envelope serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
