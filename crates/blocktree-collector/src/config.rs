//! Collector timing and upstream path configuration.
//!
//! The cadence and timeouts are fixed constants; [`CollectorConfig`] exists
//! so tests can shrink them.

use std::time::Duration;

/// Interval between the end of one tick and the start of the next.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Upper bound on a single upstream fetch, and therefore on one tick.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause after a tick fails unexpectedly before the loop resumes.
pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Fork choice debug endpoint, relative to a source's base URL.
pub const FORK_CHOICE_PATH: &str = "/eth/v1/debug/fork_choice";

/// Timing and path settings for the collection loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Sleep between ticks.
    pub poll_interval: Duration,
    /// Per-source fetch deadline.
    pub fetch_timeout: Duration,
    /// Sleep after a failed tick.
    pub error_backoff: Duration,
    /// Path appended to every source base URL.
    pub fork_choice_path: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            fetch_timeout: FETCH_TIMEOUT,
            error_backoff: ERROR_BACKOFF,
            fork_choice_path: FORK_CHOICE_PATH.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_cadence() {
        let config = CollectorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.error_backoff, Duration::from_secs(5));
        assert_eq!(config.fork_choice_path, "/eth/v1/debug/fork_choice");
    }
}
