//! Cluster and application configuration types.
//!
//! Responsibilities:
//! - Define `ClusterConfig` (base URL, bearer token, TLS flag).
//! - Define `AppConfig` and cluster selection by name.
//!
//! Does NOT handle:
//! - Parsing or validating the config file (see `loader` module).

use std::collections::BTreeMap;

use secrecy::SecretString;

use crate::loader::ConfigError;
use crate::types::SearchSettings;

/// Connection settings for a single Humio/LogScale cluster.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Cluster name (the key under `[clusters]`).
    pub name: String,
    /// Base URL without trailing slashes (e.g. `https://logscale.example.com`).
    pub url: String,
    /// Bearer token sent with every request.
    pub token: SecretString,
    /// Whether to skip TLS certificate verification (self-signed deployments).
    pub skip_ssl_verify: bool,
}

impl ClusterConfig {
    /// Create a cluster config with TLS verification enabled.
    pub fn new(name: impl Into<String>, url: impl Into<String>, token: SecretString) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            token,
            skip_ssl_verify: false,
        }
    }
}

/// Application-level configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name of the cluster used when a request does not name one.
    pub default_cluster: String,
    /// All configured clusters, keyed by name.
    pub clusters: BTreeMap<String, ClusterConfig>,
    /// Search tuning shared by every cluster.
    pub search: SearchSettings,
}

impl AppConfig {
    /// Get a cluster by name, or the default cluster when `name` is `None` or blank.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCluster`] listing the available names.
    pub fn get_cluster(&self, name: Option<&str>) -> Result<&ClusterConfig, ConfigError> {
        let cluster_name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.default_cluster);

        self.clusters
            .get(cluster_name)
            .ok_or_else(|| ConfigError::UnknownCluster {
                name: cluster_name.to_string(),
                available: self.cluster_names(),
            })
    }

    /// Names of all configured clusters in sorted order.
    pub fn cluster_names(&self) -> Vec<String> {
        self.clusters.keys().cloned().collect()
    }
}
