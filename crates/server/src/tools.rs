//! Humio tools exposed to the host.
//!
//! Responsibilities:
//! - Define parameter types and input schemas for `list_dashboards`,
//!   `get_dashboard_queries` and `execute_search`.
//! - Select the cluster and build a `HumioClient` per invocation.
//! - Apply the optional overall search deadline.
//!
//! Does NOT handle:
//! - Search, GraphQL or job lifecycle logic (see `humio-client`).
//!
//! Invariants:
//! - A missing or empty `cluster` selects the default cluster.
//! - Dropping a search at its deadline still deletes its query job.

use std::sync::Arc;
use std::time::Duration;

use humio_client::{
    DashboardListResult, DashboardQueriesResult, HumioClient, SearchRequest, SearchResult,
};
use humio_config::AppConfig;
use humio_config::constants::{DEFAULT_SEARCH_END, DEFAULT_SEARCH_START};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::registry::{ToolError, ToolRegistry};

pub const LIST_DASHBOARDS: &str = "list_dashboards";
pub const GET_DASHBOARD_QUERIES: &str = "get_dashboard_queries";
pub const EXECUTE_SEARCH: &str = "execute_search";

#[derive(Debug, Deserialize)]
pub struct ListDashboardsParams {
    pub repo: String,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub search_filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetDashboardQueriesParams {
    pub repo: String,
    pub dashboard_name: String,
    #[serde(default)]
    pub cluster: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteSearchParams {
    pub repo: String,
    pub query_string: String,
    #[serde(default = "default_start")]
    pub start: String,
    #[serde(default = "default_end")]
    pub end: String,
    #[serde(default)]
    pub cluster: Option<String>,
    /// Falls back to the configured `default_max_results`.
    #[serde(default)]
    pub max_results: Option<usize>,
}

fn default_start() -> String {
    DEFAULT_SEARCH_START.to_string()
}

fn default_end() -> String {
    DEFAULT_SEARCH_END.to_string()
}

/// Build a registry holding every Humio tool.
pub fn build_registry(config: Arc<AppConfig>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_tools(&mut registry, config);
    registry
}

/// Register the Humio tools on an existing registry.
pub fn register_tools(registry: &mut ToolRegistry, config: Arc<AppConfig>) {
    let cfg = config.clone();
    registry.register(
        LIST_DASHBOARDS,
        "List dashboards in a Humio repository or view, optionally filtered by a case-insensitive name substring.",
        list_dashboards_schema(),
        move |params: ListDashboardsParams| {
            let cfg = cfg.clone();
            async move { list_dashboards(&cfg, params).await }
        },
    );

    let cfg = config.clone();
    registry.register(
        GET_DASHBOARD_QUERIES,
        "Get the query strings and time ranges of every query widget on a dashboard.",
        get_dashboard_queries_schema(),
        move |params: GetDashboardQueriesParams| {
            let cfg = cfg.clone();
            async move { get_dashboard_queries(&cfg, params).await }
        },
    );

    let cfg = config;
    registry.register(
        EXECUTE_SEARCH,
        "Run a Humio query over a time range and return the matching events.",
        execute_search_schema(),
        move |params: ExecuteSearchParams| {
            let cfg = cfg.clone();
            async move { execute_search(&cfg, params).await }
        },
    );
}

/// Build a client for the named cluster, or the default one.
pub fn client_for(config: &AppConfig, cluster: Option<&str>) -> Result<HumioClient, ToolError> {
    let cluster = config.get_cluster(cluster).map_err(ToolError::execution)?;
    HumioClient::builder()
        .from_cluster(cluster)
        .search_settings(config.search.clone())
        .build()
        .map_err(ToolError::execution)
}

pub async fn list_dashboards(
    config: &AppConfig,
    params: ListDashboardsParams,
) -> Result<DashboardListResult, ToolError> {
    let client = client_for(config, params.cluster.as_deref())?;
    client
        .list_dashboards(&params.repo, params.search_filter.as_deref())
        .await
        .map_err(ToolError::execution)
}

pub async fn get_dashboard_queries(
    config: &AppConfig,
    params: GetDashboardQueriesParams,
) -> Result<DashboardQueriesResult, ToolError> {
    let client = client_for(config, params.cluster.as_deref())?;
    client
        .get_dashboard_queries(&params.repo, &params.dashboard_name)
        .await
        .map_err(ToolError::execution)
}

pub async fn execute_search(
    config: &AppConfig,
    params: ExecuteSearchParams,
) -> Result<SearchResult, ToolError> {
    let client = client_for(config, params.cluster.as_deref())?;
    let max_results = params
        .max_results
        .unwrap_or(config.search.default_max_results);
    let request = SearchRequest::new(params.repo, params.query_string)
        .with_start(params.start)
        .with_end(params.end)
        .with_max_results(max_results);

    info!(
        cluster = client.cluster_name(),
        repo = %request.repo,
        "execute_search invoked"
    );

    let outcome = match config.search.search_deadline {
        Some(deadline) => tokio::time::timeout(deadline, client.execute_search(&request))
            .await
            .map_err(|_| deadline_exceeded(deadline))?,
        None => client.execute_search(&request).await,
    };

    outcome.map_err(|e| {
        warn!(error = %e, "Search failed");
        ToolError::execution(e)
    })
}

fn deadline_exceeded(deadline: Duration) -> ToolError {
    warn!(
        deadline_secs = deadline.as_secs_f64(),
        "Search deadline exceeded"
    );
    ToolError::Execution(format!(
        "Search did not finish within {} seconds",
        deadline.as_secs_f64()
    ))
}

fn cluster_property() -> Value {
    json!({
        "type": "string",
        "description": "Configured cluster name. Empty or omitted uses the default cluster."
    })
}

fn list_dashboards_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "repo": {"type": "string", "description": "Repository or view name"},
            "cluster": cluster_property(),
            "search_filter": {
                "type": "string",
                "description": "Case-insensitive substring matched against dashboard names"
            }
        },
        "required": ["repo"]
    })
}

fn get_dashboard_queries_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "repo": {"type": "string", "description": "Repository or view name"},
            "dashboard_name": {
                "type": "string",
                "description": "Dashboard name, matched ignoring case"
            },
            "cluster": cluster_property()
        },
        "required": ["repo", "dashboard_name"]
    })
}

fn execute_search_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "repo": {"type": "string", "description": "Repository or view name"},
            "query_string": {"type": "string", "description": "Humio query language expression"},
            "start": {
                "type": "string",
                "description": "Relative (24h, 7d, 30m, 1w), epoch milliseconds or ISO 8601",
                "default": DEFAULT_SEARCH_START
            },
            "end": {
                "type": "string",
                "description": "'now', relative, epoch milliseconds or ISO 8601",
                "default": DEFAULT_SEARCH_END
            },
            "cluster": cluster_property(),
            "max_results": {
                "type": "integer",
                "minimum": 0,
                "description": "Maximum number of events returned"
            }
        },
        "required": ["repo", "query_string"]
    })
}
