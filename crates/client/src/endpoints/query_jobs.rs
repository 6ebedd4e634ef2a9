//! Query job operations.
//!
//! This module provides endpoints for the create, poll and delete lifecycle of
//! a server-side query job. Every call is a short-lived request, so polling
//! survives load balancers that drop idle long-held connections.
//!
//! # What this module handles:
//! - Creating query jobs
//! - Polling a job until it reports `done`
//! - Deleting jobs
//!
//! # What this module does NOT handle:
//! - Falling back to the streaming endpoint (see [`crate::client::search`])
//! - Guaranteeing deletion on every exit path (see `QueryJobGuard`)
//!
//! # Invariants
//! - HTTP status failures and unexpected bodies on create/poll map to
//!   `JobCreate` / `JobPoll`; transport failures map to `HttpError`.
//! - Nothing here retries.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::debug;

use crate::endpoints::request::{HttpFailure, send_request};
use crate::endpoints::url_encoding::{query_job_path, query_jobs_path};
use crate::error::{ClientError, Result};
use crate::models::{QueryJobCreated, QueryJobStatus, QueryPayload};
use crate::redact_query;

/// Create a query job and return its id.
pub async fn create_query_job(
    client: &Client,
    base_url: &str,
    auth_token: &str,
    repo: &str,
    payload: &QueryPayload,
    timeout: Duration,
) -> Result<String> {
    debug!(
        repo,
        start = payload.start,
        end = payload.end,
        "Creating query job: {}",
        redact_query(&payload.query_string)
    );

    let url = format!("{}{}", base_url, query_jobs_path(repo));
    let builder = client
        .post(&url)
        .header(AUTHORIZATION, format!("Bearer {}", auth_token))
        .timeout(timeout)
        .json(payload);

    let response = send_request(builder).await.map_err(|e| match e {
        HttpFailure::Transport(e) => ClientError::HttpError(e),
        HttpFailure::Status {
            status, message, ..
        } => ClientError::JobCreate {
            status: Some(status),
            message,
        },
    })?;

    let body = response.text().await?;
    let created: QueryJobCreated =
        serde_json::from_str(&body).map_err(|e| ClientError::JobCreate {
            status: None,
            message: format!("Unexpected query job response: {}", e),
        })?;

    if created.id.trim().is_empty() {
        return Err(ClientError::JobCreate {
            status: None,
            message: "Query job response has an empty id".to_string(),
        });
    }

    debug!("Created query job {}", created.id);
    Ok(created.id)
}

/// Poll a query job once.
pub async fn poll_query_job(
    client: &Client,
    base_url: &str,
    auth_token: &str,
    repo: &str,
    job_id: &str,
    timeout: Duration,
) -> Result<QueryJobStatus> {
    let url = format!("{}{}", base_url, query_job_path(repo, job_id));
    let builder = client
        .get(&url)
        .header(AUTHORIZATION, format!("Bearer {}", auth_token))
        .timeout(timeout);

    let response = send_request(builder).await.map_err(|e| match e {
        HttpFailure::Transport(e) => ClientError::HttpError(e),
        HttpFailure::Status {
            status, message, ..
        } => ClientError::JobPoll {
            status: Some(status),
            message,
        },
    })?;

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::JobPoll {
        status: None,
        message: format!("Unexpected query job poll response: {}", e),
    })
}

/// Poll a query job until it reports `done`, sleeping `poll_interval` between polls.
///
/// There is no maximum poll count; callers impose an overall deadline by
/// dropping the future.
pub async fn wait_for_query_job(
    client: &Client,
    base_url: &str,
    auth_token: &str,
    repo: &str,
    job_id: &str,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<Vec<Value>> {
    let mut polls = 0usize;
    loop {
        let status = poll_query_job(client, base_url, auth_token, repo, job_id, timeout).await?;
        polls += 1;

        if status.is_done() {
            let events = status.into_events();
            debug!(
                "Query job {} done after {} polls with {} events",
                job_id,
                polls,
                events.len()
            );
            return Ok(events);
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Delete a query job.
///
/// The response status is ignored; only transport failures are returned.
pub async fn delete_query_job(
    client: &Client,
    base_url: &str,
    auth_token: &str,
    repo: &str,
    job_id: &str,
    timeout: Duration,
) -> Result<()> {
    let url = format!("{}{}", base_url, query_job_path(repo, job_id));
    let response = client
        .delete(&url)
        .header(AUTHORIZATION, format!("Bearer {}", auth_token))
        .timeout(timeout)
        .send()
        .await?;

    debug!(
        status = response.status().as_u16(),
        "Deleted query job {}", job_id
    );
    Ok(())
}
