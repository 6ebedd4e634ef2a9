//! Search execution for [`HumioClient`].
//!
//! # What this module handles:
//! - Resolving the request's time range and building the query payload
//! - The query job path (create, poll until done, delete)
//! - Falling back to the streaming endpoint when the job API is unavailable
//! - Truncating and annotating the result
//!
//! # What this module does NOT handle:
//! - Low-level HTTP calls (in [`crate::endpoints`])
//! - An overall deadline (callers wrap `execute_search` in a timeout)
//!
//! # Invariants
//! - A created query job is deleted exactly once on every exit path,
//!   including when the search future is dropped mid-poll.
//! - Job deletion failures are logged and never surface to the caller.
//! - When the fallback runs, its outcome is the search outcome.

use std::time::Duration;

use humio_config::SearchStrategy;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::HumioClient;
use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::models::{QueryPayload, SearchRequest, SearchResult};
use crate::ndjson;
use crate::redact_query;
use crate::time_range::ResolvedTimeRange;

impl HumioClient {
    /// Execute a search and return at most `request.max_results` events.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidTimeFormat`] before any request is sent.
    /// - The streaming fallback's error when the job API is unavailable and
    ///   the fallback fails too.
    /// - Any other job-path error unrelated to job API availability.
    pub async fn execute_search(&self, request: &SearchRequest) -> Result<SearchResult> {
        let range = ResolvedTimeRange::resolve(&request.start, &request.end)?;
        let payload = QueryPayload::new(request.query_string.clone(), range);

        info!(
            cluster = %self.cluster_name,
            repo = %request.repo,
            start_ms = range.start_ms,
            end_ms = range.end_ms,
            "Executing search: {}",
            redact_query(&request.query_string)
        );

        let events = match self.settings.strategy {
            SearchStrategy::JobWithFallback => self.search_with_job(&request.repo, &payload).await?,
            SearchStrategy::StreamingOnly => self.search_streaming(&request.repo, &payload).await?,
        };

        let result = SearchResult::from_events(&self.cluster_name, request, events);
        debug!(
            total_before_limit = result.metadata.total_before_limit,
            truncated = result.metadata.truncated,
            "Search finished"
        );
        Ok(result)
    }

    /// Create a query job and poll it, falling back to streaming when the job
    /// API is unavailable.
    async fn search_with_job(&self, repo: &str, payload: &QueryPayload) -> Result<Vec<Value>> {
        let job_id = match endpoints::create_query_job(
            &self.http,
            &self.base_url,
            self.token.expose_secret(),
            repo,
            payload,
            self.settings.request_timeout,
        )
        .await
        {
            Ok(id) => id,
            Err(e) if e.is_job_api_unavailable() => {
                warn!(error = %e, "Query job API unavailable, falling back to streaming");
                return self.search_streaming(repo, payload).await;
            }
            Err(e) => return Err(e),
        };

        let job = QueryJobGuard::new(self, repo, job_id);
        let outcome = endpoints::wait_for_query_job(
            &self.http,
            &self.base_url,
            self.token.expose_secret(),
            repo,
            job.id(),
            self.settings.poll_interval,
            self.settings.request_timeout,
        )
        .await;
        job.release().await;

        match outcome {
            Ok(events) => Ok(events),
            Err(e) if e.is_job_api_unavailable() => {
                warn!(error = %e, "Query job polling failed, falling back to streaming");
                self.search_streaming(repo, payload).await
            }
            Err(e) => Err(e),
        }
    }

    async fn search_streaming(&self, repo: &str, payload: &QueryPayload) -> Result<Vec<Value>> {
        let text = endpoints::stream_query(
            &self.stream_http,
            &self.base_url,
            self.token.expose_secret(),
            repo,
            payload,
            &self.stream_retry,
        )
        .await?;
        Ok(ndjson::decode(&text))
    }
}

/// Scoped ownership of a server-side query job.
///
/// `release()` deletes the job and waits for the delete. If the guard is
/// dropped without being released (the owning future was cancelled), the
/// delete is spawned onto the current tokio runtime instead.
struct QueryJobGuard {
    http: Client,
    base_url: String,
    token: SecretString,
    repo: String,
    id: String,
    timeout: Duration,
    released: bool,
}

impl QueryJobGuard {
    fn new(client: &HumioClient, repo: &str, id: String) -> Self {
        Self {
            http: client.http.clone(),
            base_url: client.base_url.clone(),
            token: client.token.clone(),
            repo: repo.to_string(),
            id,
            timeout: client.settings.request_timeout,
            released: false,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    /// Delete the job, swallowing failures.
    ///
    /// The delete runs as its own task, so cancelling the caller while it is
    /// in flight does not abort it.
    async fn release(mut self) {
        if let Some(task) = self.spawn_delete() {
            let _ = task.await;
        }
    }

    /// Start the delete on the current runtime. Only the first call does anything.
    fn spawn_delete(&mut self) -> Option<JoinHandle<()>> {
        if self.released {
            return None;
        }
        self.released = true;

        let http = self.http.clone();
        let base_url = std::mem::take(&mut self.base_url);
        let token = self.token.clone();
        let repo = std::mem::take(&mut self.repo);
        let id = std::mem::take(&mut self.id);
        let timeout = self.timeout;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Some(handle.spawn(async move {
                delete_best_effort(&http, &base_url, &token, &repo, &id, timeout).await;
            })),
            Err(_) => {
                warn!("No async runtime available, query job {} was not deleted", id);
                None
            }
        }
    }
}

impl Drop for QueryJobGuard {
    fn drop(&mut self) {
        if !self.released {
            debug!("Search cancelled, deleting query job {} in background", self.id);
            self.spawn_delete();
        }
    }
}

async fn delete_best_effort(
    http: &Client,
    base_url: &str,
    token: &SecretString,
    repo: &str,
    id: &str,
    timeout: Duration,
) {
    if let Err(e) =
        endpoints::delete_query_job(http, base_url, token.expose_secret(), repo, id, timeout).await
    {
        warn!(error = %e, "Failed to delete query job {}", id);
    }
}
