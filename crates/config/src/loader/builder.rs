//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for hierarchical configuration merging.
//! - Support loading from the TOML config file, environment variables, and builder methods.
//! - Validate and normalize the final `AppConfig`.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//! - File discovery and TOML parsing (delegated to file.rs).
//!
//! Invariants / Assumptions:
//! - Builder methods take precedence over environment variables, which take
//!   precedence over file values.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::ExposeSecret;

use super::env::apply_env;
use super::error::ConfigError;
use super::file::{RawConfig, RawSearch, candidate_paths, read_config, resolve_config_path};
use crate::constants::{MAX_STREAM_ATTEMPTS, MAX_TIMEOUT_SECS};
use crate::types::{AppConfig, ClusterConfig, SearchSettings};

/// Configuration loader that builds config from the config file and environment.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    default_cluster: Option<String>,
    poll_interval: Option<Duration>,
    stream_timeout: Option<Duration>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` environment variable is set to "true" or "1",
    /// the .env file will not be loaded (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the `.env` file exists but has invalid syntax
    /// or cannot be read. Missing `.env` files are silently ignored.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Check if a dotenv error indicates the file was not found.
    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Use an explicit config file path instead of the default search order.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Override the default cluster named in the config file.
    pub fn with_default_cluster(mut self, name: String) -> Self {
        self.default_cluster = Some(name);
        self
    }

    /// Override the query job poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Override the streaming fallback read timeout.
    pub fn with_stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = Some(timeout);
        self
    }

    /// Read overrides from environment variables.
    ///
    /// Values already set through builder methods are kept.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    /// Locate, read and validate the config file.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let candidates = candidate_paths(self.config_path.as_deref());
        let path = resolve_config_path(&candidates)?;
        tracing::debug!("Loading configuration from {}", path.display());
        let raw = read_config(&path)?;
        self.build_from_raw(raw)
    }

    /// Validate raw file contents and apply overrides.
    pub(crate) fn build_from_raw(self, raw: RawConfig) -> Result<AppConfig, ConfigError> {
        if raw.clusters.is_empty() {
            return Err(ConfigError::NoClusters);
        }

        let first_in_file = raw.clusters.first().map(|(name, _)| name.clone());
        let mut clusters = BTreeMap::new();
        for (name, cluster) in raw.clusters {
            let url = validate_and_normalize_base_url(&name, &cluster.url)?;
            if cluster.token.expose_secret().trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    var: format!("clusters.{name}.token"),
                    message: "must not be empty".to_string(),
                });
            }
            if cluster.skip_ssl_verify && url.starts_with("http://") {
                tracing::warn!(
                    "skip_ssl_verify=true has no effect on HTTP URL for cluster '{}'",
                    name
                );
            }
            clusters.insert(
                name.clone(),
                ClusterConfig {
                    name,
                    url,
                    token: cluster.token,
                    skip_ssl_verify: cluster.skip_ssl_verify,
                },
            );
        }

        let requested_default = self
            .default_cluster
            .or(raw.default_cluster)
            .filter(|name| !name.trim().is_empty());

        let default_cluster = match requested_default {
            Some(name) if clusters.contains_key(&name) => name,
            Some(name) => return Err(ConfigError::UnknownDefaultCluster(name)),
            None => first_in_file.ok_or(ConfigError::NoClusters)?,
        };

        let mut search = build_search_settings(&raw.search)?;
        if let Some(interval) = self.poll_interval {
            search.poll_interval = interval;
        }
        if let Some(timeout) = self.stream_timeout {
            search.stream_timeout = timeout;
        }
        Self::validate_search_settings(&search)?;

        Ok(AppConfig {
            default_cluster,
            clusters,
            search,
        })
    }

    /// Validates search tuning values.
    ///
    /// Checks:
    /// - poll interval is greater than 0
    /// - request and stream timeouts are in 1..=MAX_TIMEOUT_SECS
    /// - max_stream_attempts is in 1..=MAX_STREAM_ATTEMPTS
    fn validate_search_settings(search: &SearchSettings) -> Result<(), ConfigError> {
        if search.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                var: "search.poll_interval_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        for (var, timeout) in [
            ("search.request_timeout_secs", search.request_timeout),
            ("search.stream_timeout_secs", search.stream_timeout),
        ] {
            let secs = timeout.as_secs();
            if secs == 0 || secs > MAX_TIMEOUT_SECS {
                return Err(ConfigError::InvalidValue {
                    var: var.to_string(),
                    message: format!("must be between 1 and {MAX_TIMEOUT_SECS} seconds"),
                });
            }
        }

        if search.max_stream_attempts == 0 || search.max_stream_attempts > MAX_STREAM_ATTEMPTS {
            return Err(ConfigError::InvalidValue {
                var: "search.max_stream_attempts".to_string(),
                message: format!("must be between 1 and {MAX_STREAM_ATTEMPTS}"),
            });
        }

        if search.search_deadline.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::InvalidValue {
                var: "search.deadline_secs".to_string(),
                message: "must be greater than 0 when set".to_string(),
            });
        }

        Ok(())
    }

    // Internal accessor methods for use by other loader modules

    pub(crate) fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub(crate) fn set_config_path(&mut self, path: Option<PathBuf>) {
        self.config_path = path;
    }

    pub(crate) fn default_cluster(&self) -> Option<&String> {
        self.default_cluster.as_ref()
    }

    pub(crate) fn set_default_cluster(&mut self, name: Option<String>) {
        self.default_cluster = name;
    }

    pub(crate) fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval
    }

    pub(crate) fn set_poll_interval(&mut self, interval: Option<Duration>) {
        self.poll_interval = interval;
    }

    pub(crate) fn stream_timeout(&self) -> Option<Duration> {
        self.stream_timeout
    }

    pub(crate) fn set_stream_timeout(&mut self, timeout: Option<Duration>) {
        self.stream_timeout = timeout;
    }
}

fn build_search_settings(raw: &RawSearch) -> Result<SearchSettings, ConfigError> {
    let defaults = SearchSettings::default();
    Ok(SearchSettings {
        poll_interval: raw
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval),
        request_timeout: raw
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout),
        stream_timeout: raw
            .stream_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.stream_timeout),
        max_stream_attempts: raw
            .max_stream_attempts
            .unwrap_or(defaults.max_stream_attempts),
        stream_backoff_step: raw
            .stream_backoff_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.stream_backoff_step),
        default_max_results: raw
            .default_max_results
            .unwrap_or(defaults.default_max_results),
        search_deadline: raw.deadline_secs.map(Duration::from_secs),
        strategy: raw.strategy.unwrap_or(defaults.strategy),
    })
}

/// Validate a cluster URL and strip trailing slashes.
fn validate_and_normalize_base_url(cluster: &str, raw: &str) -> Result<String, ConfigError> {
    let var = format!("clusters.{cluster}.url");
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            var,
            message: "must not be empty".into(),
        });
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidValue {
        var: var.clone(),
        message: format!(
            "must be an absolute http(s) URL with a host (e.g. https://cloud.humio.com): {e}"
        ),
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::InvalidValue {
            var,
            message: format!("scheme must be http or https, got: {scheme}"),
        });
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            var,
            message: "host is required (e.g. https://cloud.humio.com)".into(),
        });
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
