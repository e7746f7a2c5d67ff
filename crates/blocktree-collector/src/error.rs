//! Error types for the collector.
//!
//! [`FetchError`] never escapes a tick: it is logged and the source is
//! omitted. [`CollectorError`] covers the failures that can escape a tick
//! or prevent the collector from starting.

/// Failure to obtain a raw payload from one source.
///
/// Every variant carries the endpoint that was polled.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection could not be established or the request failed in flight.
    #[error("{endpoint}: request failed: {message}")]
    Request {
        /// Polled URL.
        endpoint: String,
        /// Transport error description.
        message: String,
    },

    /// No complete response within the fetch timeout.
    #[error("{endpoint}: no response within {timeout_ms} ms")]
    Timeout {
        /// Polled URL.
        endpoint: String,
        /// The deadline that elapsed.
        timeout_ms: u128,
    },

    /// The source answered with a non-success status code.
    #[error("{endpoint}: upstream returned HTTP {status}")]
    Status {
        /// Polled URL.
        endpoint: String,
        /// Returned status code.
        status: u16,
    },

    /// The response body was not valid JSON.
    #[error("{endpoint}: malformed response body: {message}")]
    Body {
        /// Polled URL.
        endpoint: String,
        /// Decode error description.
        message: String,
    },
}

impl FetchError {
    /// The URL whose fetch failed.
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Request { endpoint, .. }
            | Self::Timeout { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Body { endpoint, .. } => endpoint,
        }
    }
}

/// Errors that can escape a tick or stop the collector from starting.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// The sink could not publish the merged view.
    #[error("publish error: {0}")]
    Publish(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}
