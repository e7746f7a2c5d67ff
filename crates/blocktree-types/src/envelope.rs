//! Push-channel message envelope.
//!
//! Every message the server pushes is a self-describing JSON object:
//!
//! ```json
//! {"type": "fork_choice_update", "timestamp": 1700000000.25, "data": {"http://node:7777": {...}}}
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::fork_choice::ForkChoiceMap;

/// Discriminator carried in the envelope's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EnvelopeKind {
    /// Sent once to a subscriber right after it connects.
    InitialData,
    /// Sent to every subscriber after each collection tick.
    ForkChoiceUpdate,
}

/// A push-channel message borrowing the merged view it carries.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<'a> {
    /// Message kind.
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    /// Send time in Unix seconds.
    pub timestamp: f64,
    /// Per-source snapshots.
    pub data: &'a ForkChoiceMap,
}

impl<'a> Envelope<'a> {
    /// Wrap a merged view, stamping it with the current time.
    pub fn new(kind: EnvelopeKind, data: &'a ForkChoiceMap) -> Self {
        Self {
            kind,
            timestamp: crate::unix_timestamp(),
            data,
        }
    }

    /// Serialize to the JSON text sent on the wire.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
