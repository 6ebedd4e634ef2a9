//! GraphQL endpoint.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::endpoints::request::{HttpFailure, send_request};
use crate::error::{ClientError, Result};
use crate::models::{GraphQlRequest, GraphQlResponse};

/// Execute a GraphQL query and deserialize its `data` object.
///
/// A missing or null `data` is treated as an empty object, so `T` should
/// default its fields.
///
/// # Errors
///
/// - [`ClientError::RemoteQuery`] for an HTTP error status or a non-empty
///   `errors` array (messages joined with `"; "`).
/// - [`ClientError::InvalidResponse`] when the body or `data` has an unexpected shape.
pub async fn execute_graphql<V, T>(
    client: &Client,
    base_url: &str,
    auth_token: &str,
    query: &str,
    variables: Option<V>,
    timeout: Duration,
) -> Result<T>
where
    V: Serialize,
    T: DeserializeOwned,
{
    let url = format!("{}/graphql", base_url);
    let body = GraphQlRequest { query, variables };
    let builder = client
        .post(&url)
        .header(AUTHORIZATION, format!("Bearer {}", auth_token))
        .timeout(timeout)
        .json(&body);

    let response = send_request(builder).await.map_err(|e| match e {
        HttpFailure::Transport(e) => ClientError::HttpError(e),
        HttpFailure::Status {
            status, message, ..
        } => ClientError::RemoteQuery {
            status: Some(status),
            message,
        },
    })?;

    let text = response.text().await?;
    let envelope: GraphQlResponse = serde_json::from_str(&text)
        .map_err(|e| ClientError::InvalidResponse(format!("GraphQL response: {}", e)))?;

    if let Some(message) = envelope.error_message() {
        debug!("GraphQL query returned errors");
        return Err(ClientError::RemoteQuery {
            status: None,
            message,
        });
    }

    let data = match envelope.data {
        Some(Value::Null) | None => Value::Object(Default::default()),
        Some(data) => data,
    };
    serde_json::from_value(data)
        .map_err(|e| ClientError::InvalidResponse(format!("GraphQL data: {}", e)))
}
