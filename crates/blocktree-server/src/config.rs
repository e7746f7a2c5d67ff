//! Process configuration loaded from the environment.
//!
//! Only the source list and the listening socket are configurable; poll
//! cadence and fetch timeout are fixed in
//! [`CollectorConfig`](blocktree_collector::CollectorConfig).

use std::path::PathBuf;

use blocktree_observer::ServerConfig;
use blocktree_types::SourceId;

use crate::error::AppError;

/// Sources polled when `BEACON_ENDPOINTS` is unset.
pub const DEFAULT_BEACON_ENDPOINTS: &str = "http://beacon-chain-1:7777,http://beacon-chain-2:7777,http://beacon-chain-3:7777,http://beacon-chain-4:7777";

/// Complete process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Upstream nodes to poll, in configuration order.
    pub sources: Vec<SourceId>,
    /// Listening socket for the Observer API.
    pub server: ServerConfig,
    /// Root directory for static dashboard assets.
    pub static_dir: PathBuf,
}

impl Settings {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `BEACON_ENDPOINTS` -- comma-separated source base URLs (default: four local beacon nodes)
    /// - `OBSERVER_HOST` -- bind host (default `0.0.0.0`)
    /// - `OBSERVER_PORT` -- bind port (default `8000`)
    /// - `STATIC_DIR` -- static asset root (default `static`)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let endpoints =
            lookup("BEACON_ENDPOINTS").unwrap_or_else(|| DEFAULT_BEACON_ENDPOINTS.to_owned());

        let defaults = ServerConfig::default();
        let host = lookup("OBSERVER_HOST").unwrap_or(defaults.host);
        let port = match lookup("OBSERVER_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("invalid OBSERVER_PORT {raw:?}: {e}")))?,
            None => defaults.port,
        };

        let static_dir = lookup("STATIC_DIR").unwrap_or_else(|| {
            blocktree_observer::state::DEFAULT_STATIC_DIR.to_owned()
        });

        Ok(Self {
            sources: SourceId::parse_list(&endpoints),
            server: ServerConfig { host, port },
            static_dir: PathBuf::from(static_dir),
        })
    }
}
