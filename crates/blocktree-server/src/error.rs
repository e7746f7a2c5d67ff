//! Error types for the blocktree binary.
//!
//! [`AppError`] wraps every failure that can stop the process during
//! startup. Nothing after startup is fatal.

/// Top-level error for the blocktree binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Environment configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// The collector could not be constructed.
    #[error("collector error: {source}")]
    Collector {
        /// The underlying collector error.
        #[from]
        source: blocktree_collector::CollectorError,
    },

    /// The Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: blocktree_observer::startup::StartupError,
    },
}
