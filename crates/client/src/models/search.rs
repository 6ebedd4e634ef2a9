//! Search models: request, wire payload, query job responses and results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use humio_config::constants::{DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_END, DEFAULT_SEARCH_START};

use crate::time_range::ResolvedTimeRange;

/// An ad-hoc search against one repository.
///
/// `start` and `end` are kept raw; they are resolved at execution time and
/// echoed back unchanged in the [`SearchResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub repo: String,
    pub query_string: String,
    pub start: String,
    pub end: String,
    pub max_results: usize,
}

impl SearchRequest {
    /// Create a request over the last 24 hours capped at 200 events.
    pub fn new(repo: impl Into<String>, query_string: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            query_string: query_string.into(),
            start: DEFAULT_SEARCH_START.to_string(),
            end: DEFAULT_SEARCH_END.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Set the raw start expression.
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    /// Set the raw end expression.
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = end.into();
        self
    }

    /// Set the result cap.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Body of the query job create and streaming query requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    pub query_string: String,
    pub start: i64,
    pub end: i64,
    pub is_live: bool,
}

impl QueryPayload {
    /// Build a static (non-live) query over a resolved range.
    pub fn new(query_string: impl Into<String>, range: ResolvedTimeRange) -> Self {
        Self {
            query_string: query_string.into(),
            start: range.start_ms,
            end: range.end_ms,
            is_live: false,
        }
    }
}

/// Response to query job creation.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryJobCreated {
    pub id: String,
}

/// Response to a query job poll.
///
/// A missing or null `done` reads as not done; missing or null `events` reads as empty.
/// Other fields (`metaData`, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryJobStatus {
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default)]
    pub events: Option<Vec<Value>>,
}

impl QueryJobStatus {
    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(false)
    }

    pub fn into_events(self) -> Vec<Value> {
        self.events.unwrap_or_default()
    }
}

/// Truncation metadata attached to every search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub total_before_limit: usize,
    pub max_results: usize,
    pub truncated: bool,
}

/// Result of executing a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub cluster: String,
    pub repo: String,
    pub query_string: String,
    pub start: String,
    pub end: String,
    pub events: Vec<Value>,
    pub total_events: usize,
    pub metadata: SearchMetadata,
}

impl SearchResult {
    /// Truncate `events` to the request's cap and annotate the result.
    pub fn from_events(cluster: &str, request: &SearchRequest, mut events: Vec<Value>) -> Self {
        let total_before_limit = events.len();
        events.truncate(request.max_results);

        Self {
            cluster: cluster.to_string(),
            repo: request.repo.clone(),
            query_string: request.query_string.clone(),
            start: request.start.clone(),
            end: request.end.clone(),
            total_events: events.len(),
            events,
            metadata: SearchMetadata {
                total_before_limit,
                max_results: request.max_results,
                truncated: total_before_limit > request.max_results,
            },
        }
    }
}
