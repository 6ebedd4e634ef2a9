//! Humio API client and API methods.
//!
//! This module provides the primary [`HumioClient`] for one Humio/LogScale
//! cluster.
//!
//! # Submodules
//! - [`builder`]: Client construction and configuration
//! - `search`: Search execution (query job with streaming fallback)
//! - `dashboards`: Dashboard listing and widget query extraction
//!
//! # What this module does NOT handle:
//! - Direct HTTP request implementation (delegated to [`crate::endpoints`])
//! - Cluster selection (handled by `humio_config::AppConfig`)
//!
//! # Invariants
//! - The base URL never ends with a slash
//! - The bearer token is only exposed when a request header is built

pub mod builder;
mod dashboards;
mod search;

use humio_config::SearchSettings;
use secrecy::SecretString;

use crate::endpoints::StreamRetryPolicy;

/// Humio/LogScale API client for a single cluster.
///
/// Cloning is cheap: the underlying `reqwest::Client`s share their connection pools.
///
/// # Creating a Client
///
/// ```rust,ignore
/// use humio_client::HumioClient;
///
/// let cluster = config.get_cluster(None)?;
/// let client = HumioClient::builder()
///     .from_cluster(cluster)
///     .search_settings(config.search.clone())
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct HumioClient {
    /// Short-lived calls (GraphQL, job create/poll/delete); each sets its own timeout.
    pub(crate) http: reqwest::Client,
    /// Streaming fallback; carries the stream read timeout.
    pub(crate) stream_http: reqwest::Client,
    pub(crate) cluster_name: String,
    pub(crate) base_url: String,
    pub(crate) token: SecretString,
    pub(crate) settings: SearchSettings,
    pub(crate) stream_retry: StreamRetryPolicy,
}

impl HumioClient {
    /// Create a new client builder.
    pub fn builder() -> builder::HumioClientBuilder {
        builder::HumioClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Name of the cluster this client talks to.
    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Search tuning in effect.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }
}
