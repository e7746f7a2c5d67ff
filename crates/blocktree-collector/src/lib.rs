//! Fork choice collection for blocktree.
//!
//! Polls a fixed set of upstream nodes on a fixed cadence, normalizes each
//! node's fork choice payload into a [`Snapshot`], and hands the merged
//! per-tick view to a [`CollectionSink`].
//!
//! # Pipeline
//!
//! ```text
//! timer --> fetch (all sources, concurrently) --> parse --> merge --> sink
//! ```
//!
//! One slow or failing source never blocks the others: every fetch is
//! bounded by the fetch timeout and failures only drop that source from
//! the tick's result.
//!
//! [`Snapshot`]: blocktree_types::Snapshot

pub mod config;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod scheduler;

pub use config::CollectorConfig;
pub use error::{CollectorError, FetchError};
pub use fetch::{FetchSource, HttpFetcher};
pub use parse::parse;
pub use scheduler::{CollectionSink, Collector, Phase, TickReport};
