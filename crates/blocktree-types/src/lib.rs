//! Shared type definitions for the blocktree workspace.
//!
//! Every crate that touches fork choice data speaks in the records defined
//! here: the collector produces them, the observer serves and pushes them.
//! Types that reach the dashboard are exported to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Source and subscriber identifiers
//! - [`fork_choice`] -- Normalized block node, checkpoint, and snapshot records
//! - [`envelope`] -- Push-channel message envelope

pub mod envelope;
pub mod fork_choice;
pub mod ids;

pub use envelope::{Envelope, EnvelopeKind};
pub use fork_choice::{BlockNode, Checkpoint, ForkChoiceMap, Snapshot};
pub use ids::{SourceId, SubscriberId};

/// Current wall-clock time as fractional Unix seconds.
///
/// All wire timestamps (snapshot collection time, envelope time, health
/// probe time) use this representation.
#[allow(clippy::cast_precision_loss)]
pub fn unix_timestamp() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp_micros() as f64 / 1_000_000.0
}
