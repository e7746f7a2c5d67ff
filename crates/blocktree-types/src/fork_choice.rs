//! Normalized fork choice records.
//!
//! A [`Snapshot`] is one source's view of the candidate block tree at one
//! poll. Numeric-looking fields (slots, epochs, weights, balances) are kept
//! as opaque decimal text: upstream nodes emit arbitrary-precision integers
//! and nothing in this workspace does arithmetic on them.
//!
//! Snapshots are immutable once built. The merged view of every source,
//! [`ForkChoiceMap`], is likewise built once per tick and then only read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::SourceId;

/// A justified or finalized checkpoint as reported by the source.
///
/// Usually holds `epoch` and `root`; any other string keys the source
/// emits are carried through untouched. Empty when the source omitted it.
pub type Checkpoint = BTreeMap<String, String>;

/// Default for text-encoded integers.
pub const ZERO: &str = "0";

/// Default for a block's validity when the source does not report one.
pub const UNKNOWN_VALIDITY: &str = "unknown";

// ---------------------------------------------------------------------------
// BlockNode
// ---------------------------------------------------------------------------

/// One candidate block as seen by one source at one poll.
///
/// Missing fields take the zero value documented on each field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BlockNode {
    /// Slot number (default `"0"`).
    pub slot: String,
    /// Block root hash, hex encoded (default empty).
    pub block_root: String,
    /// Parent block root; empty for the tree root.
    pub parent_root: String,
    /// Justified epoch (default `"0"`).
    pub justified_epoch: String,
    /// Finalized epoch (default `"0"`).
    pub finalized_epoch: String,
    /// Attested stake behind this block (default `"0"`).
    pub weight: String,
    /// Execution validity, e.g. `valid`, `invalid`, `optimistic` (default `"unknown"`).
    pub validity: String,
    /// Execution payload block hash (default empty).
    pub execution_block_hash: String,
    /// Block timestamp from the source's extra data (default `"0"`).
    pub timestamp: String,
    /// Target checkpoint root from the source's extra data (default empty).
    pub target: String,
    /// Unrealized justified epoch (default `"0"`).
    pub unrealized_justified_epoch: String,
    /// Unrealized finalized epoch (default `"0"`).
    pub unrealized_finalized_epoch: String,
    /// Balance backing the block (default `"0"`).
    pub balance: String,
    /// Whether the execution payload is only optimistically imported (default `false`).
    pub execution_optimistic: bool,
}

impl Default for BlockNode {
    fn default() -> Self {
        Self {
            slot: ZERO.to_owned(),
            block_root: String::new(),
            parent_root: String::new(),
            justified_epoch: ZERO.to_owned(),
            finalized_epoch: ZERO.to_owned(),
            weight: ZERO.to_owned(),
            validity: UNKNOWN_VALIDITY.to_owned(),
            execution_block_hash: String::new(),
            timestamp: ZERO.to_owned(),
            target: String::new(),
            unrealized_justified_epoch: ZERO.to_owned(),
            unrealized_finalized_epoch: ZERO.to_owned(),
            balance: ZERO.to_owned(),
            execution_optimistic: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One source's fork choice view, normalized.
///
/// `nodes` keeps the order in which the source emitted them; no sorting
/// and no de-duplication by `block_root` is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Justified checkpoint.
    pub justified_checkpoint: Checkpoint,
    /// Finalized checkpoint.
    pub finalized_checkpoint: Checkpoint,
    /// Unrealized justified checkpoint.
    pub unrealized_justified_checkpoint: Checkpoint,
    /// Unrealized finalized checkpoint.
    pub unrealized_finalized_checkpoint: Checkpoint,
    /// Root of the block the source currently considers head.
    pub head_root: String,
    /// Block currently receiving proposer boost.
    pub proposer_boost_root: String,
    /// Block that received proposer boost in the previous slot.
    pub previous_proposer_boost_root: String,
    /// Candidate blocks in source emission order.
    pub nodes: Vec<BlockNode>,
    /// Wall-clock collection time in Unix seconds, assigned by the collector.
    pub timestamp: f64,
}

impl Snapshot {
    /// Number of block nodes in this snapshot.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

// ---------------------------------------------------------------------------
// ForkChoiceMap
// ---------------------------------------------------------------------------

/// The merged view: latest snapshot of every source that succeeded in one
/// collection tick.
///
/// A source that failed the tick has no entry at all, which is distinct
/// from an entry with zero nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForkChoiceMap(BTreeMap<SourceId, Snapshot>);

impl ForkChoiceMap {
    /// Create an empty map.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Snapshot for one source, if it succeeded.
    pub fn get(&self, source: &SourceId) -> Option<&Snapshot> {
        self.0.get(source)
    }

    /// Whether the source has a snapshot in this view.
    pub fn contains(&self, source: &SourceId) -> bool {
        self.0.contains_key(source)
    }

    /// Number of sources present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no source is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over present sources and their snapshots, ordered by source.
    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, &Snapshot)> {
        self.0.iter()
    }

    /// Present source identifiers, ordered.
    pub fn sources(&self) -> impl Iterator<Item = &SourceId> {
        self.0.keys()
    }
}

impl FromIterator<(SourceId, Snapshot)> for ForkChoiceMap {
    fn from_iter<I: IntoIterator<Item = (SourceId, Snapshot)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
