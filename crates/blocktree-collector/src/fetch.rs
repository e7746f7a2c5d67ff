//! Single bounded-timeout fetch of one source's raw fork choice payload.
//!
//! [`FetchSource`] is the seam between the scheduler and the network. The
//! production implementation, [`HttpFetcher`], issues one `GET` per call
//! through a shared `reqwest` client; tests substitute in-memory fetchers.

use std::future::Future;
use std::time::Duration;

use blocktree_types::SourceId;
use serde_json::Value;

use crate::config::CollectorConfig;
use crate::error::{CollectorError, FetchError};

/// Something that can fetch one source's raw fork choice payload.
///
/// Implementations must not panic and must report every failure as a
/// [`FetchError`]. The scheduler applies its own deadline on top, so a
/// fetch that never resolves is still cut off.
pub trait FetchSource: Send + Sync {
    /// Fetch the raw payload for `source`.
    fn fetch(&self, source: &SourceId) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// HTTP fetcher for the Beacon API fork choice debug endpoint.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    path: String,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher whose requests are bounded by `config.fetch_timeout`.
    pub fn new(config: &CollectorConfig) -> Result<Self, CollectorError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| CollectorError::Client(e.to_string()))?;

        Ok(Self {
            client,
            path: config.fork_choice_path.clone(),
            timeout: config.fetch_timeout,
        })
    }

    /// Full URL polled for `source`.
    pub fn url_for(&self, source: &SourceId) -> String {
        format!("{}{}", source.as_str(), self.path)
    }
}

impl FetchSource for HttpFetcher {
    async fn fetch(&self, source: &SourceId) -> Result<Value, FetchError> {
        let endpoint = self.url_for(source);

        let response = self.client.get(&endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    endpoint: endpoint.clone(),
                    timeout_ms: self.timeout.as_millis(),
                }
            } else {
                FetchError::Request {
                    endpoint: endpoint.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    endpoint: endpoint.clone(),
                    timeout_ms: self.timeout.as_millis(),
                }
            } else {
                FetchError::Body {
                    endpoint: endpoint.clone(),
                    message: e.to_string(),
                }
            }
        })
    }
}
