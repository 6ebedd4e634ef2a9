//! Tool handler tests against a mock Humio server.
//!
//! This module tests the registered tools through `ToolRegistry::call`:
//! - Cluster selection (named, empty and unknown)
//! - Parameter defaults for `execute_search`
//! - The overall search deadline
//! - Cancelling a running search through the stdio host
//!
//! # What this does NOT handle
//! - Search fallback behavior (see humio-client search_executor_tests.rs)

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use humio_config::SearchStrategy;
use humio_mcp::tools::{self, EXECUTE_SEARCH, GET_DASHBOARD_QUERIES, LIST_DASHBOARDS};
use humio_mcp::{McpServer, ToolError, ToolRegistry};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JOBS_PATH: &str = "/api/v1/repositories/production/queryjobs";
const JOB_PATH: &str = "/api/v1/repositories/production/queryjobs/job-1";

fn dashboards_body() -> Value {
    json!({
        "data": {
            "searchDomain": {
                "dashboards": [
                    {"id": "d1", "name": "Errors", "description": null},
                    {"id": "d2", "name": "Traffic", "description": "Requests per second"}
                ]
            }
        }
    })
}

fn registry(config: humio_config::AppConfig) -> ToolRegistry {
    tools::build_registry(Arc::new(config))
}

#[tokio::test]
async fn test_registry_lists_three_tools() {
    let registry = registry(config_for("http://localhost:1", "http://localhost:2"));
    let names: Vec<&str> = registry.list().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec![EXECUTE_SEARCH, GET_DASHBOARD_QUERIES, LIST_DASHBOARDS]);
}

#[tokio::test]
async fn test_empty_cluster_uses_default() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboards_body()))
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboards_body()))
        .expect(0)
        .mount(&secondary)
        .await;

    let registry = registry(config_for(&primary.uri(), &secondary.uri()));
    let result = registry
        .call(LIST_DASHBOARDS, json!({"repo": "production", "cluster": ""}))
        .await
        .unwrap();

    assert_eq!(result["cluster"], "primary");
    assert_eq!(result["total"], 2);
    assert_eq!(result["dashboards"][0]["name"], "Errors");
}

#[tokio::test]
async fn test_named_cluster_is_used() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboards_body()))
        .expect(1)
        .mount(&secondary)
        .await;

    let registry = registry(config_for(&primary.uri(), &secondary.uri()));
    let result = registry
        .call(
            LIST_DASHBOARDS,
            json!({"repo": "production", "cluster": "secondary", "search_filter": "traf"}),
        )
        .await
        .unwrap();

    assert_eq!(result["cluster"], "secondary");
    assert_eq!(result["total"], 1);
    assert_eq!(result["dashboards"][0]["id"], "d2");
}

#[tokio::test]
async fn test_unknown_cluster_lists_available() {
    let registry = registry(config_for("http://localhost:1", "http://localhost:2"));
    let err = registry
        .call(LIST_DASHBOARDS, json!({"repo": "production", "cluster": "staging"}))
        .await
        .unwrap_err();

    match err {
        ToolError::Execution(message) => {
            assert!(message.contains("staging"));
            assert!(message.contains("primary, secondary"));
        }
        other => panic!("Expected Execution, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_required_param() {
    let registry = registry(config_for("http://localhost:1", "http://localhost:2"));
    let err = registry
        .call(GET_DASHBOARD_QUERIES, json!({"repo": "production"}))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::InvalidParams { .. }));
}

#[tokio::test]
async fn test_dashboard_not_found_is_execution_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboards_body()))
        .mount(&server)
        .await;

    let registry = registry(config_for(&server.uri(), "http://localhost:2"));
    let err = registry
        .call(
            GET_DASHBOARD_QUERIES,
            json!({"repo": "production", "dashboard_name": "Latency"}),
        )
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("Latency"));
    assert!(message.contains("Errors, Traffic"));
}

#[tokio::test]
async fn test_execute_search_applies_defaults() {
    let server = MockServer::start().await;

    let events: Vec<Value> = (0..250).map(|i| json!({"n": i})).collect();
    Mock::given(method("POST"))
        .and(path(JOBS_PATH))
        .and(body_partial_json(json!({"queryString": "count()", "isLive": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"done": true, "events": events})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(config_for(&server.uri(), "http://localhost:2"));
    let result = registry
        .call(
            EXECUTE_SEARCH,
            json!({"repo": "production", "query_string": "count()"}),
        )
        .await
        .unwrap();

    assert_eq!(result["start"], "24h");
    assert_eq!(result["end"], "now");
    assert_eq!(result["total_events"], 200);
    assert_eq!(result["metadata"]["total_before_limit"], 250);
    assert_eq!(result["metadata"]["max_results"], 200);
    assert_eq!(result["metadata"]["truncated"], true);
}

#[tokio::test]
async fn test_execute_search_invalid_time() {
    let server = MockServer::start().await;
    let registry = registry(config_for(&server.uri(), "http://localhost:2"));

    let err = registry
        .call(
            EXECUTE_SEARCH,
            json!({"repo": "production", "query_string": "*", "end": "tomorrow"}),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Invalid time format: 'tomorrow'"));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_execute_search_deadline_deletes_job() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(JOBS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": false})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut config = config_for(&server.uri(), "http://localhost:2");
    config.search.search_deadline = Some(Duration::from_millis(200));
    let registry = registry(config);

    let err = registry
        .call(
            EXECUTE_SEARCH,
            json!({"repo": "production", "query_string": "*"}),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("did not finish"));

    let mut deletes = 0;
    for _ in 0..200 {
        deletes = job_deletes(&server).await;
        if deletes > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(deletes, 1);
}

#[tokio::test]
async fn test_execute_search_streaming_strategy() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/repositories/production/query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("{\"a\":1}\n{\"a\":2}\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server.uri(), "http://localhost:2");
    config.search.strategy = SearchStrategy::StreamingOnly;
    let registry = registry(config);

    let result = registry
        .call(
            EXECUTE_SEARCH,
            json!({"repo": "production", "query_string": "*", "max_results": 1}),
        )
        .await
        .unwrap();

    assert_eq!(result["events"], json!([{"a": 1}]));
    assert_eq!(result["metadata"]["truncated"], true);
}

async fn job_deletes(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "DELETE" && r.url.path() == JOB_PATH)
        .count()
}

#[tokio::test]
async fn test_cancelled_search_deletes_job_and_ping_still_answers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(JOBS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": false})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mcp = McpServer::new(registry(config_for(&server.uri(), "http://localhost:2")));
    let (mut input, server_input) = tokio::io::duplex(4096);
    let (server_output, output) = tokio::io::duplex(4096);
    let serving = tokio::spawn(async move {
        mcp.serve(BufReader::new(server_input), server_output)
            .await
    });
    let mut responses = BufReader::new(output).lines();

    let search = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {
            "name": EXECUTE_SEARCH,
            "arguments": {"repo": "production", "query_string": "*"}
        }
    });
    let ping = json!({"jsonrpc": "2.0", "id": 2, "method": "ping"});
    input
        .write_all(format!("{}\n{}\n", search, ping).as_bytes())
        .await
        .unwrap();

    let line = tokio::time::timeout(Duration::from_secs(5), responses.next_line())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let first: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(first["id"], 2);
    assert_eq!(job_deletes(&server).await, 0);

    let cancel = json!({
        "jsonrpc": "2.0",
        "method": "notifications/cancelled",
        "params": {"requestId": 1, "reason": "user"}
    });
    input
        .write_all(format!("{}\n", cancel).as_bytes())
        .await
        .unwrap();

    let mut deletes = 0;
    for _ in 0..200 {
        deletes = job_deletes(&server).await;
        if deletes > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(deletes, 1);

    drop(input);
    tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    // The cancelled request is never answered.
    assert!(responses.next_line().await.unwrap().is_none());
}
