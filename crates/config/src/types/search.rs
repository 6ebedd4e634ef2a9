//! Search tuning settings.
//!
//! Invariants:
//! - All durations are non-zero once produced by the loader.
//! - `max_stream_attempts` counts the initial attempt.

use std::time::Duration;

use serde::Deserialize;

use crate::constants::{
    DEFAULT_MAX_RESULTS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_STREAM_ATTEMPTS, DEFAULT_STREAM_BACKOFF_SECS, DEFAULT_STREAM_TIMEOUT_SECS,
};

/// How a search is executed against the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Query job API (create, poll, delete), streaming fallback when unavailable.
    #[default]
    #[serde(alias = "job")]
    JobWithFallback,
    /// Always use the streaming query endpoint.
    #[serde(alias = "streaming")]
    StreamingOnly,
}

/// Tuning for search execution.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Interval between query job polls.
    pub poll_interval: Duration,
    /// Timeout for short-lived requests (GraphQL, job create/poll/delete).
    pub request_timeout: Duration,
    /// Read timeout for the streaming fallback request.
    pub stream_timeout: Duration,
    /// Total streaming attempts on transient transport failure.
    pub max_stream_attempts: usize,
    /// Linear backoff step between streaming attempts.
    pub stream_backoff_step: Duration,
    /// Default result cap when a request does not set one.
    pub default_max_results: usize,
    /// Optional end-to-end deadline imposed around a whole search.
    pub search_deadline: Option<Duration>,
    /// Execution strategy.
    pub strategy: SearchStrategy,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            stream_timeout: Duration::from_secs(DEFAULT_STREAM_TIMEOUT_SECS),
            max_stream_attempts: DEFAULT_STREAM_ATTEMPTS,
            stream_backoff_step: Duration::from_secs(DEFAULT_STREAM_BACKOFF_SECS),
            default_max_results: DEFAULT_MAX_RESULTS,
            search_deadline: None,
            strategy: SearchStrategy::JobWithFallback,
        }
    }
}
