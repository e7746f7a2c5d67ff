//! The collection loop: poll every source concurrently, merge, publish.
//!
//! Each tick moves [`Phase::Idle`] to [`Phase::Collecting`] when it starts
//! and back to [`Phase::Idle`] once every fetch has resolved and the results
//! are merged.
//! Fetches run concurrently and each is bounded by the fetch timeout, so a
//! tick takes at most one fetch timeout regardless of the source count.
//!
//! The merged view contains only the sources that succeeded in the tick.
//! A source that fails is absent until a later tick succeeds; it does not
//! keep showing its previous snapshot.

use std::sync::atomic::{AtomicBool, Ordering};

use blocktree_types::{ForkChoiceMap, SourceId};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::CollectorConfig;
use crate::error::CollectorError;
use crate::fetch::FetchSource;
use crate::parse;

/// Receiver of each tick's merged view.
///
/// The observer implements this to swap its latest-state handle and push
/// the update to subscribers.
pub trait CollectionSink: Send + Sync {
    /// Install `map` as the latest view and deliver it to subscribers.
    ///
    /// Returns the number of subscribers the update was handed to.
    fn publish(&self, map: ForkChoiceMap) -> Result<usize, CollectorError>;
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Between ticks.
    Idle,
    /// Fetch and parse fan-out in flight.
    Collecting,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Sources present in the merged view.
    pub succeeded: usize,
    /// Sources omitted this tick.
    pub failed: usize,
    /// Subscribers the update was handed to.
    pub delivered: usize,
}

/// Polls a fixed list of sources on a fixed cadence.
pub struct Collector<F> {
    sources: Vec<SourceId>,
    fetcher: F,
    config: CollectorConfig,
    collecting: AtomicBool,
}

impl<F: FetchSource> Collector<F> {
    /// Create a collector over `sources`.
    pub const fn new(sources: Vec<SourceId>, fetcher: F, config: CollectorConfig) -> Self {
        Self {
            sources,
            fetcher,
            config,
            collecting: AtomicBool::new(false),
        }
    }

    /// Current scheduler state.
    pub fn phase(&self) -> Phase {
        if self.collecting.load(Ordering::Acquire) {
            Phase::Collecting
        } else {
            Phase::Idle
        }
    }

    /// Fetch every source concurrently and merge the successes.
    ///
    /// Failures are logged and leave their source out of the result. The
    /// returned map is stamped with a single collection time taken once all
    /// fetches have resolved.
    pub async fn collect_once(&self) -> ForkChoiceMap {
        let _phase = PhaseGuard::enter(&self.collecting);
        let payloads = join_all(self.sources.iter().map(|source| self.fetch_bounded(source))).await;

        let collected_at = blocktree_types::unix_timestamp();

        payloads
            .into_iter()
            .flatten()
            .map(|(source, payload)| {
                if !parse::is_recognized(&payload) {
                    debug!(source = %source, "Unrecognized fork choice payload, recording empty snapshot");
                }
                let snapshot = parse::parse(&payload, collected_at);
                info!(source = %source, nodes = snapshot.node_count(), "Fork choice collected");
                (source, snapshot)
            })
            .collect()
    }

    /// Run one tick: collect, then hand the merged view to `sink`.
    pub async fn tick<S: CollectionSink + ?Sized>(&self, sink: &S) -> Result<TickReport, CollectorError> {
        let map = self.collect_once().await;
        let succeeded = map.len();
        let failed = self.sources.len().saturating_sub(succeeded);

        let delivered = sink.publish(map)?;
        debug!(succeeded, failed, delivered, "Tick complete");

        Ok(TickReport {
            succeeded,
            failed,
            delivered,
        })
    }

    /// Run the collection loop for the life of the process.
    ///
    /// A failed tick is logged and followed by the longer error backoff;
    /// the loop itself never returns.
    pub async fn run<S: CollectionSink + ?Sized>(&self, sink: &S) {
        info!(
            sources = self.sources.len(),
            poll_interval_ms = self.config.poll_interval.as_millis(),
            fetch_timeout_ms = self.config.fetch_timeout.as_millis(),
            "Collection loop starting"
        );

        loop {
            match self.tick(sink).await {
                Ok(_) => tokio::time::sleep(self.config.poll_interval).await,
                Err(e) => {
                    error!(
                        error = %e,
                        backoff_ms = self.config.error_backoff.as_millis(),
                        "Collection tick failed, backing off"
                    );
                    tokio::time::sleep(self.config.error_backoff).await;
                }
            }
        }
    }

    /// Fetch one source under the fetch deadline.
    async fn fetch_bounded(&self, source: &SourceId) -> Option<(SourceId, Value)> {
        match tokio::time::timeout(self.config.fetch_timeout, self.fetcher.fetch(source)).await {
            Ok(Ok(payload)) => Some((source.clone(), payload)),
            Ok(Err(e)) => {
                warn!(source = %source, error = %e, "Fork choice fetch failed");
                None
            }
            Err(_elapsed) => {
                warn!(
                    source = %source,
                    timeout_ms = self.config.fetch_timeout.as_millis(),
                    "Fork choice fetch timed out"
                );
                None
            }
        }
    }
}

/// Holds [`Phase::Collecting`] until dropped.
struct PhaseGuard<'a>(&'a AtomicBool);

impl<'a> PhaseGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
