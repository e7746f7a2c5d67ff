//! Normalization of raw fork choice payloads into [`Snapshot`] records.
//!
//! Upstream payloads are untrusted and frequently partial. Parsing is a
//! best-effort projection, never a validation: every missing or mistyped
//! field falls back to the zero value documented on [`BlockNode`], and a
//! payload whose top level is unrecognizable yields an empty snapshot.
//!
//! Parsing is deterministic. The collection timestamp is supplied by the
//! caller; nothing here reads the clock.
//!
//! Expected shape (Beacon API `GET /eth/v1/debug/fork_choice`):
//!
//! ```json
//! {
//!   "justified_checkpoint": {"epoch": "3", "root": "0x.."},
//!   "finalized_checkpoint": {"epoch": "2", "root": "0x.."},
//!   "fork_choice_nodes": [{"slot": "96", "block_root": "0x..", "extra_data": {..}}],
//!   "extra_data": {"head_root": "0x..", "proposer_boost_root": "0x.."}
//! }
//! ```

use blocktree_types::fork_choice::{UNKNOWN_VALIDITY, ZERO};
use blocktree_types::{BlockNode, Checkpoint, Snapshot};
use serde_json::{Map, Value};

/// Key of the node list in the upstream payload.
pub const NODES_KEY: &str = "fork_choice_nodes";

/// Key of the auxiliary data map, both top-level and per node.
const EXTRA_DATA_KEY: &str = "extra_data";

/// Normalize a raw payload into a snapshot stamped with `collected_at`.
///
/// Never fails. A payload that is not a JSON object produces an empty
/// snapshot (no nodes, empty checkpoints, empty roots).
pub fn parse(raw: &Value, collected_at: f64) -> Snapshot {
    let Some(root) = raw.as_object() else {
        return Snapshot {
            timestamp: collected_at,
            ..Snapshot::default()
        };
    };

    let nodes = root
        .get(NODES_KEY)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_object)
                .map(parse_node)
                .collect()
        })
        .unwrap_or_default();

    let extra = object_or_empty(root.get(EXTRA_DATA_KEY));

    Snapshot {
        justified_checkpoint: checkpoint(root.get("justified_checkpoint")),
        finalized_checkpoint: checkpoint(root.get("finalized_checkpoint")),
        unrealized_justified_checkpoint: checkpoint(extra.get("unrealized_justified_checkpoint")),
        unrealized_finalized_checkpoint: checkpoint(extra.get("unrealized_finalized_checkpoint")),
        head_root: text(extra, "head_root", ""),
        proposer_boost_root: text(extra, "proposer_boost_root", ""),
        previous_proposer_boost_root: text(extra, "previous_proposer_boost_root", ""),
        nodes,
        timestamp: collected_at,
    }
}

/// Whether the payload has the expected top-level shape.
///
/// `false` means [`parse`] degraded to an empty snapshot. The result is
/// still valid data; callers only use this for diagnostics.
pub fn is_recognized(raw: &Value) -> bool {
    raw.as_object()
        .and_then(|root| root.get(NODES_KEY))
        .is_some_and(Value::is_array)
}

/// Normalize one entry of the node list.
fn parse_node(node: &Map<String, Value>) -> BlockNode {
    let extra = object_or_empty(node.get(EXTRA_DATA_KEY));

    BlockNode {
        slot: text(node, "slot", ZERO),
        block_root: text(node, "block_root", ""),
        parent_root: text(node, "parent_root", ""),
        justified_epoch: text(node, "justified_epoch", ZERO),
        finalized_epoch: text(node, "finalized_epoch", ZERO),
        weight: text(node, "weight", ZERO),
        validity: text(node, "validity", UNKNOWN_VALIDITY),
        execution_block_hash: text(node, "execution_block_hash", ""),
        timestamp: text(extra, "timestamp", ZERO),
        target: text(extra, "target", ""),
        unrealized_justified_epoch: text(extra, "unrealized_justified_epoch", ZERO),
        unrealized_finalized_epoch: text(extra, "unrealized_finalized_epoch", ZERO),
        balance: text(extra, "balance", ZERO),
        execution_optimistic: flag(extra, "execution_optimistic"),
    }
}

/// Shared empty map for absent or non-object `extra_data`.
fn object_or_empty(value: Option<&Value>) -> &Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    value
        .and_then(Value::as_object)
        .unwrap_or_else(|| EMPTY.get_or_init(Map::new))
}

/// Read a text field, accepting JSON numbers as their decimal rendering.
fn text(map: &Map<String, Value>, key: &str, default: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_owned(),
    }
}

/// Read a boolean field, accepting `"true"`/`"false"` strings.
fn flag(map: &Map<String, Value>, key: &str) -> bool {
    match map.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Read a checkpoint map, keeping string and numeric entries.
fn checkpoint(value: Option<&Value>) -> Checkpoint {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(key, value)| match value {
                    Value::String(s) => Some((key.clone(), s.clone())),
                    Value::Number(n) => Some((key.clone(), n.to_string())),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}
