//! Shared request execution and error-body extraction.
//!
//! Requests are sent once. Callers decide how a failure is classified: the
//! query job endpoints turn status failures into job-API-unavailable errors,
//! the streaming endpoint retries transient transport failures.

use reqwest::{RequestBuilder, Response};
use tracing::debug;

/// Maximum number of characters of an error body kept in error messages.
const MAX_ERROR_BODY_CHARS: usize = 1024;

/// A failed HTTP exchange.
#[derive(Debug)]
pub enum HttpFailure {
    /// The request never produced a response (connect, send, or header read failed).
    Transport(reqwest::Error),
    /// The server answered with a non-success status.
    Status {
        status: u16,
        url: String,
        message: String,
    },
}

/// Send a request and require a success status.
///
/// Non-success responses are consumed and their body (truncated) becomes the
/// error message.
pub async fn send_request(builder: RequestBuilder) -> Result<Response, HttpFailure> {
    let response = builder.send().await.map_err(HttpFailure::Transport)?;

    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let url = response.url().to_string();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response body".to_string());
    let message = error_message(status, &body);

    debug!(status = status.as_u16(), url = %url, "Request failed");

    Err(HttpFailure::Status {
        status: status.as_u16(),
        url,
        message,
    })
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string();
    }

    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{truncated}...")
    } else {
        body.to_string()
    }
}
