//! Error types for the Humio client.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during Humio client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A start/end expression matched none of the recognized forms.
    #[error(
        "Invalid time format: '{value}'. Use a relative time (e.g. 24h, 7d), epoch milliseconds, ISO 8601, or 'now' for the end time"
    )]
    InvalidTimeFormat { value: String },

    /// The server rejected query job creation or answered without a job id.
    #[error("Query job creation failed{}: {message}", display_status(.status))]
    JobCreate {
        status: Option<u16>,
        message: String,
    },

    /// A query job poll failed with an HTTP status or an unexpected body.
    #[error("Query job poll failed{}: {message}", display_status(.status))]
    JobPoll {
        status: Option<u16>,
        message: String,
    },

    /// Transient transport failures persisted through every streaming attempt.
    #[error("Search request failed after {attempts} attempts: {source}")]
    SearchTransport {
        attempts: usize,
        #[source]
        source: reqwest::Error,
    },

    /// The remote platform reported an error for a query.
    #[error("Humio query error{}: {message}", display_status(.status))]
    RemoteQuery {
        status: Option<u16>,
        message: String,
    },

    /// A named dashboard does not exist in the repository.
    #[error(
        "Dashboard '{name}' not found in repo '{repo}'. Available dashboards: {}",
        display_names(.available)
    )]
    NotFound {
        name: String,
        repo: String,
        available: Vec<String>,
    },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid response format from Humio.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No bearer token was supplied to the client builder.
    #[error("A bearer token is required")]
    MissingToken,
}

impl ClientError {
    /// Check if this error means the query job API cannot serve the search,
    /// in which case the streaming endpoint is used instead.
    pub fn is_job_api_unavailable(&self) -> bool {
        matches!(self, Self::JobCreate { .. } | Self::JobPoll { .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::JobCreate { status, .. }
            | Self::JobPoll { status, .. }
            | Self::RemoteQuery { status, .. } => *status,
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

fn display_names(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_errors_are_job_api_unavailable() {
        let err = ClientError::JobCreate {
            status: Some(404),
            message: "Not Found".to_string(),
        };
        assert!(err.is_job_api_unavailable());

        let err = ClientError::JobPoll {
            status: None,
            message: "missing done".to_string(),
        };
        assert!(err.is_job_api_unavailable());

        let err = ClientError::RemoteQuery {
            status: Some(400),
            message: "bad query".to_string(),
        };
        assert!(!err.is_job_api_unavailable());
    }

    #[test]
    fn test_status_display() {
        let err = ClientError::JobCreate {
            status: Some(503),
            message: "unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Query job creation failed (HTTP 503): unavailable"
        );
        assert_eq!(err.status(), Some(503));

        let err = ClientError::RemoteQuery {
            status: None,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Humio query error: boom");
    }

    #[test]
    fn test_not_found_lists_available_dashboards() {
        let err = ClientError::NotFound {
            name: "Ops".to_string(),
            repo: "main".to_string(),
            available: vec!["Errors".to_string(), "Latency".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Dashboard 'Ops' not found in repo 'main'. Available dashboards: Errors, Latency"
        );
    }
}
