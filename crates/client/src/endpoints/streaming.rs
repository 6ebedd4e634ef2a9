//! Streaming query endpoint with bounded retry.
//!
//! The whole search runs as one long-lived `POST .../query` whose NDJSON body
//! is accumulated chunk by chunk. It is used when the query job API is
//! unavailable, or always under the streaming-only strategy.
//!
//! # Invariants
//! - The only time limit is the client's per-read timeout. A response that
//!   keeps sending data is never cut off, however long it runs.
//! - Only transient transport failures are retried: connect failures, dropped
//!   or reset connections, and truncated bodies. Read timeouts and HTTP error
//!   statuses fail immediately.
//! - Backoff is linear: the wait after failed attempt `n` is `n * backoff_step`.
//!   There is no wait after the final attempt.
//! - Waits go through [`StreamRetryPolicy`]'s sleep hook.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use tracing::{debug, warn};

use humio_config::constants::{DEFAULT_STREAM_ATTEMPTS, DEFAULT_STREAM_BACKOFF_SECS};

use crate::endpoints::request::{HttpFailure, send_request};
use crate::endpoints::url_encoding::streaming_query_path;
use crate::error::{ClientError, Result};
use crate::models::QueryPayload;
use crate::redact_query;

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Async sleep used between streaming attempts.
pub type SleepFn = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// Sleep hook backed by `tokio::time::sleep`.
pub fn tokio_sleep() -> SleepFn {
    Arc::new(|duration: Duration| tokio::time::sleep(duration).boxed())
}

/// Retry settings for the streaming endpoint.
#[derive(Clone)]
pub struct StreamRetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: usize,
    /// Linear backoff step.
    pub backoff_step: Duration,
    sleep: SleepFn,
}

impl StreamRetryPolicy {
    pub fn new(max_attempts: usize, backoff_step: Duration) -> Self {
        Self {
            max_attempts,
            backoff_step,
            sleep: tokio_sleep(),
        }
    }

    /// Replace the sleep hook.
    pub fn with_sleep(mut self, sleep: SleepFn) -> Self {
        self.sleep = sleep;
        self
    }

    /// Wait applied after the given failed attempt (1-based).
    pub fn backoff_for(&self, failed_attempt: usize) -> Duration {
        self.backoff_step
            .saturating_mul(u32::try_from(failed_attempt).unwrap_or(u32::MAX))
    }
}

impl Default for StreamRetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_STREAM_ATTEMPTS,
            Duration::from_secs(DEFAULT_STREAM_BACKOFF_SECS),
        )
    }
}

impl fmt::Debug for StreamRetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamRetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("backoff_step", &self.backoff_step)
            .finish_non_exhaustive()
    }
}

/// Check if a transport error is worth another streaming attempt.
pub fn is_transient(err: &reqwest::Error) -> bool {
    !err.is_timeout() && (err.is_connect() || err.is_request() || err.is_body() || err.is_decode())
}

enum StreamFailure {
    Transient(reqwest::Error),
    Fatal(ClientError),
}

fn classify(err: reqwest::Error) -> StreamFailure {
    if is_transient(&err) {
        StreamFailure::Transient(err)
    } else {
        StreamFailure::Fatal(ClientError::HttpError(err))
    }
}

/// Run a query on the streaming endpoint and return the raw NDJSON text.
///
/// `client` should be built with `ClientBuilder::read_timeout`; no overall
/// deadline is applied here.
///
/// # Errors
///
/// - [`ClientError::SearchTransport`] when every attempt hit a transient failure;
///   the last failure is the source.
/// - [`ClientError::RemoteQuery`] for an HTTP error status.
/// - [`ClientError::HttpError`] for other transport failures, e.g. read timeouts.
pub async fn stream_query(
    client: &Client,
    base_url: &str,
    auth_token: &str,
    repo: &str,
    payload: &QueryPayload,
    policy: &StreamRetryPolicy,
) -> Result<String> {
    debug!(
        repo,
        "Streaming query: {}",
        redact_query(&payload.query_string)
    );

    let url = format!("{}{}", base_url, streaming_query_path(repo));
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0usize;

    loop {
        attempt += 1;
        match stream_once(client, &url, auth_token, payload).await {
            Ok(text) => {
                if attempt > 1 {
                    debug!(attempt, "Streaming query succeeded after retry");
                }
                return Ok(text);
            }
            Err(StreamFailure::Transient(e)) if attempt < max_attempts => {
                let wait = policy.backoff_for(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    wait_secs = wait.as_secs_f64(),
                    error = %e,
                    "Transient streaming failure, retrying"
                );
                (policy.sleep)(wait).await;
            }
            Err(StreamFailure::Transient(e)) => {
                warn!(attempts = attempt, error = %e, "Streaming attempts exhausted");
                return Err(ClientError::SearchTransport {
                    attempts: attempt,
                    source: e,
                });
            }
            Err(StreamFailure::Fatal(e)) => return Err(e),
        }
    }
}

async fn stream_once(
    client: &Client,
    url: &str,
    auth_token: &str,
    payload: &QueryPayload,
) -> std::result::Result<String, StreamFailure> {
    let builder = client
        .post(url)
        .header(AUTHORIZATION, format!("Bearer {}", auth_token))
        .header(ACCEPT, NDJSON_CONTENT_TYPE)
        .json(payload);

    let mut response = match send_request(builder).await {
        Ok(response) => response,
        Err(HttpFailure::Transport(e)) => return Err(classify(e)),
        Err(HttpFailure::Status {
            status, message, ..
        }) => {
            return Err(StreamFailure::Fatal(ClientError::RemoteQuery {
                status: Some(status),
                message,
            }));
        }
    };

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(classify)? {
        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}
