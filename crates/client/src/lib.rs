//! Humio/LogScale API client.
//!
//! This crate provides a type-safe client for searching Humio/LogScale
//! repositories and reading dashboard metadata. Searches run on the query job
//! API (create, poll, delete) and fall back to the streaming query endpoint
//! when the job API is unavailable.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod ndjson;
pub mod time_range;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub use client::HumioClient;
pub use client::builder::HumioClientBuilder;
pub use error::{ClientError, Result};
pub use models::{
    DashboardInfo, DashboardListResult, DashboardQueriesResult, QueryPayload, SearchMetadata,
    SearchRequest, SearchResult, WidgetQuery,
};
pub use time_range::ResolvedTimeRange;

/// Redact a query string for logging, showing only its length and a hash.
///
/// Query text can contain tokens or personal data.
pub fn redact_query(query: &str) -> String {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    let hash = hasher.finish();
    format!("<{} chars, hash={:08x}>", query.len(), hash)
}
