//! Config file discovery and TOML parsing.
//!
//! Responsibilities:
//! - Determine the ordered list of candidate config file locations.
//! - Read and deserialize the TOML file into raw (unvalidated) structures.
//!
//! Does NOT handle:
//! - Validation and defaulting (see builder.rs).
//! - Environment variable overrides (see env.rs).
//!
//! Invariants:
//! - An explicit path is the only candidate when one is given.
//! - Without an explicit path, `./config.toml` is tried before the platform config dir.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ConfigError;
use crate::constants::{APP_NAME, CONFIG_FILE_NAME};
use crate::types::SearchStrategy;

/// Module for deserializing SecretString from plain strings.
mod secret_string {
    use secrecy::SecretString;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString::new(s.into()))
    }
}

/// Deserializes `[clusters]` as `(name, cluster)` pairs in file order.
mod ordered_clusters {
    use std::fmt;

    use serde::Deserializer;
    use serde::de::{MapAccess, Visitor};

    use super::RawCluster;

    struct ClustersVisitor;

    impl<'de> Visitor<'de> for ClustersVisitor {
        type Value = Vec<(String, RawCluster)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a table of clusters")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut clusters = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, RawCluster>()? {
                clusters.push(entry);
            }
            Ok(clusters)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, RawCluster)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ClustersVisitor)
    }
}

/// Top-level structure of `config.toml`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawConfig {
    #[serde(default)]
    pub default_cluster: Option<String>,
    /// Clusters in the order they appear in the file.
    #[serde(default, deserialize_with = "ordered_clusters::deserialize")]
    pub clusters: Vec<(String, RawCluster)>,
    #[serde(default)]
    pub search: RawSearch,
}

/// One `[clusters.<name>]` table.
#[derive(Debug, Deserialize)]
pub(crate) struct RawCluster {
    pub url: String,
    #[serde(deserialize_with = "secret_string::deserialize")]
    pub token: SecretString,
    #[serde(default)]
    pub skip_ssl_verify: bool,
}

/// Optional `[search]` table.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSearch {
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub stream_timeout_secs: Option<u64>,
    pub max_stream_attempts: Option<usize>,
    pub stream_backoff_secs: Option<u64>,
    pub default_max_results: Option<usize>,
    pub deadline_secs: Option<u64>,
    pub strategy: Option<SearchStrategy>,
}

/// Platform config file path, e.g. `~/.config/humio-mcp/config.toml` on Linux.
pub(crate) fn default_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)
        .ok_or(ConfigError::ConfigDirUnavailable)?;
    Ok(proj_dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Ordered candidate locations for the config file.
pub(crate) fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
    match default_config_path() {
        Ok(path) => candidates.push(path),
        Err(e) => tracing::debug!("Skipping platform config dir: {}", e),
    }
    candidates
}

/// Return the first candidate that exists as a regular file.
pub(crate) fn resolve_config_path(candidates: &[PathBuf]) -> Result<PathBuf, ConfigError> {
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| ConfigError::NotFound {
            searched: candidates.to_vec(),
        })
}

/// Parse TOML config contents; `path` is used for error context only.
pub(crate) fn parse_config(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|e| ConfigError::ConfigFileParse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

/// Read and parse the config file at `path`.
pub(crate) fn read_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFileRead {
        path: path.to_path_buf(),
        kind: e.kind(),
    })?;
    parse_config(&contents, path)
}
