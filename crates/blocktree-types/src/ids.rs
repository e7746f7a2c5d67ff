//! Identifier types.
//!
//! A [`SourceId`] names one polled upstream node by its base URL. A
//! [`SubscriberId`] names one live push-channel connection; it is a UUID v7
//! so identifiers sort by connection time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Identity of one upstream source: its normalized base URL.
///
/// Normalization trims surrounding whitespace and any trailing `/` so that
/// `http://node:7777/` and `http://node:7777` key the same map entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct SourceId(String);

impl SourceId {
    /// Create a source identifier from a base URL.
    pub fn new(base_url: &str) -> Self {
        Self(base_url.trim().trim_end_matches('/').to_owned())
    }

    /// The normalized base URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a comma-separated list of base URLs, dropping blank entries.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',')
            .map(Self::new)
            .filter(|id| !id.0.is_empty())
            .collect()
    }
}

impl core::fmt::Display for SourceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(base_url: &str) -> Self {
        Self::new(base_url)
    }
}

/// Identity of one push-channel subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubscriberId(pub Uuid);

impl SubscriberId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_id_strips_trailing_slash_and_whitespace() {
        assert_eq!(SourceId::new(" http://a:7777/ ").as_str(), "http://a:7777");
        assert_eq!(SourceId::new("http://a:7777"), SourceId::new("http://a:7777/"));
    }

    #[test]
    fn parse_list_drops_blank_entries() {
        let ids = SourceId::parse_list("http://a:1, ,http://b:2,");
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.first().map(SourceId::as_str), Some("http://a:1"));
        assert_eq!(ids.get(1).map(SourceId::as_str), Some("http://b:2"));
    }

    #[test]
    fn parse_list_of_empty_string_is_empty() {
        assert!(SourceId::parse_list("").is_empty());
    }

    #[test]
    fn source_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&SourceId::new("http://a:1")).ok();
        assert_eq!(json.as_deref(), Some("\"http://a:1\""));
    }

    #[test]
    fn subscriber_ids_are_unique() {
        assert_ne!(SubscriberId::new(), SubscriberId::new());
    }
}
