//! Data models for Humio API requests and responses.
//!
//! This module provides the typed wire schema for the query job, streaming and
//! GraphQL endpoints, and the normalized result types returned to callers.
//! Types are organized by resource in submodules and re-exported here.

pub mod dashboards;
pub mod graphql;
pub mod search;

pub use dashboards::{DashboardInfo, DashboardListResult, DashboardQueriesResult, WidgetQuery};
pub use graphql::{GraphQlRequest, GraphQlResponse};
pub use search::{
    QueryJobCreated, QueryJobStatus, QueryPayload, SearchMetadata, SearchRequest, SearchResult,
};
