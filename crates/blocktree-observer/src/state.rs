//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the latest merged fork choice view behind an atomic
//! pointer, and the registry of push subscribers. The collector is the
//! only writer; every HTTP and `WebSocket` handler is a reader.

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use blocktree_collector::{CollectionSink, CollectorError};
use blocktree_types::ForkChoiceMap;

use crate::broadcast::{self, BroadcastReport};
use crate::error::PublishError;
use crate::registry::SubscriberRegistry;

/// Default static asset root, relative to the working directory.
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState {
    /// Latest merged view. `None` until the first tick completes.
    latest: ArcSwapOption<ForkChoiceMap>,
    /// Live push subscribers.
    pub registry: Arc<SubscriberRegistry>,
    /// Root directory for static dashboard assets.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create a state with no collected data and no subscribers.
    pub fn new() -> Self {
        Self::with_static_dir(DEFAULT_STATIC_DIR)
    }

    /// Create a state serving static assets from `dir`.
    pub fn with_static_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            latest: ArcSwapOption::empty(),
            registry: Arc::new(SubscriberRegistry::new()),
            static_dir: dir.into(),
        }
    }

    /// The latest merged view, or `None` if no tick has completed.
    ///
    /// An empty map means collection ran and every source failed or none
    /// is configured.
    pub fn latest(&self) -> Option<Arc<ForkChoiceMap>> {
        self.latest.load_full()
    }

    /// Install `map` as the latest view, then broadcast it.
    ///
    /// The swap is atomic: readers see either the previous view or this
    /// one, never a mix.
    pub fn update(&self, map: ForkChoiceMap) -> Result<BroadcastReport, PublishError> {
        let map = Arc::new(map);
        self.latest.store(Some(Arc::clone(&map)));
        broadcast::broadcast(&self.registry, &map)
    }

    /// Number of registered push subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of sources present in the latest view.
    pub fn source_count(&self) -> usize {
        self.latest().map_or(0, |map| map.len())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionSink for AppState {
    fn publish(&self, map: ForkChoiceMap) -> Result<usize, CollectorError> {
        self.update(map)
            .map(|report| report.delivered)
            .map_err(|e| CollectorError::Publish(e.to_string()))
    }
}
