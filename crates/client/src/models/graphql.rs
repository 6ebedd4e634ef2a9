//! GraphQL request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GraphQL request body.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
}

/// A GraphQL response body.
///
/// `data` is kept untyped until `errors` has been checked.
#[derive(Debug, Default, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<Value>>,
}

impl GraphQlResponse {
    /// Error messages joined with `"; "`, or `None` when there are no errors.
    pub fn error_message(&self) -> Option<String> {
        let errors = self.errors.as_ref().filter(|e| !e.is_empty())?;
        Some(
            errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string())
                })
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_message_joins_messages() {
        let resp: GraphQlResponse = serde_json::from_value(json!({
            "data": null,
            "errors": [{"message": "first"}, {"code": 7}]
        }))
        .unwrap();
        assert_eq!(resp.error_message().unwrap(), "first; {\"code\":7}");
    }

    #[test]
    fn test_empty_errors_is_success() {
        let resp: GraphQlResponse =
            serde_json::from_value(json!({"data": {}, "errors": []})).unwrap();
        assert!(resp.error_message().is_none());
    }

    #[test]
    fn test_request_omits_missing_variables() {
        let req: GraphQlRequest<'_, Value> = GraphQlRequest {
            query: "{ viewer { id } }",
            variables: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"query": "{ viewer { id } }"})
        );
    }
}
