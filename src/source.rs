//! Replay source boundary
//!
//! A [`ReplaySource`] supplies the recorded event log in a single
//! request/response exchange. There is no pagination, streaming, or retry:
//! one fetch either yields a full [`ReplayPayload`] or fails.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::DEFAULT_SOURCE_TIMEOUT_MS;
use crate::error::{Result, WolfreelError};
use crate::events::GameEvent;

/// Wire shape of one replay fetch.
///
/// A recorder-side failure arrives as `{ "error": "..." }`; everything else
/// is defaulted so a partial payload still parses and the `error` field can
/// be inspected first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReplayPayload {
    /// Recorder-reported failure, checked before anything else
    pub error: Option<String>,
    /// Ordered event log
    pub events: Vec<GameEvent>,
    /// Wall-clock length of the recorded game, in seconds (informational)
    pub total_duration: f64,
    /// Recording start, seconds since epoch (informational)
    pub start_time: f64,
}

/// Capability to fetch a replay payload.
#[async_trait]
pub trait ReplaySource: Send + Sync {
    /// Fetch the payload. One exchange, no retry.
    async fn fetch(&self) -> Result<ReplayPayload>;

    /// Short name of the source, for log fields
    fn name(&self) -> &str {
        "replay-source"
    }
}

/// Fetches the replay payload from an HTTP endpoint with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpReplaySource {
    url: String,
    timeout: Duration,
}

impl HttpReplaySource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_millis(DEFAULT_SOURCE_TIMEOUT_MS),
        }
    }

    /// Override the fetch timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ReplaySource for HttpReplaySource {
    async fn fetch(&self) -> Result<ReplayPayload> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| WolfreelError::load(format!("Failed to create HTTP client: {}", e)))?;

        let resp = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| WolfreelError::load(format!("Request to {} failed: {}", self.url, e)))?;

        if !resp.status().is_success() {
            return Err(WolfreelError::load(format!(
                "Replay request to {} returned status {}",
                self.url,
                resp.status()
            )));
        }

        resp.json::<ReplayPayload>()
            .await
            .map_err(|e| WolfreelError::load(format!("Malformed replay payload: {}", e)))
    }

    fn name(&self) -> &str {
        &self.url
    }
}

/// Reads the replay payload from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileReplaySource {
    path: PathBuf,
}

impl FileReplaySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReplaySource for FileReplaySource {
    async fn fetch(&self) -> Result<ReplayPayload> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            WolfreelError::load(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            WolfreelError::load(format!(
                "Malformed replay payload {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn name(&self) -> &str {
        self.path.to_str().unwrap_or("replay-file")
    }
}

/// In-memory source serving a fixed payload. Used by tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticReplaySource {
    payload: ReplayPayload,
}

impl StaticReplaySource {
    pub fn new(payload: ReplayPayload) -> Self {
        Self { payload }
    }

    /// Source serving the given events with zeroed metadata
    pub fn with_events(events: Vec<GameEvent>) -> Self {
        Self::new(ReplayPayload {
            events,
            ..Default::default()
        })
    }

    /// Source whose payload reports a recorder-side error
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(ReplayPayload {
            error: Some(reason.into()),
            ..Default::default()
        })
    }
}

#[async_trait]
impl ReplaySource for StaticReplaySource {
    async fn fetch(&self) -> Result<ReplayPayload> {
        Ok(self.payload.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
