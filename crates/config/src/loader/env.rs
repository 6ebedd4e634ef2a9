//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse environment variables that override the config file.
//! - Provide a helper for reading env vars with empty/whitespace filtering.
//!
//! Does NOT handle:
//! - Reading the config file (see file.rs).
//! - .env file loading (handled by ConfigLoader::load_dotenv).
//!
//! Invariants:
//! - Environment variables take precedence over config file values.
//! - Builder methods take precedence over environment variables.
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Invalid numeric values return ConfigError::InvalidValue.

use std::path::PathBuf;
use std::time::Duration;

use super::builder::ConfigLoader;
use super::error::ConfigError;
use crate::constants::CONFIG_PATH_ENV;

/// Environment variable selecting the default cluster.
pub const CLUSTER_ENV: &str = "HUMIO_MCP_CLUSTER";

/// Environment variable overriding the job poll interval (milliseconds).
pub const POLL_INTERVAL_ENV: &str = "HUMIO_MCP_POLL_INTERVAL_MS";

/// Environment variable overriding the streaming read timeout (seconds).
pub const STREAM_TIMEOUT_ENV: &str = "HUMIO_MCP_STREAM_TIMEOUT";

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_u64(var: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        message: "must be a non-negative integer".to_string(),
    })
}

/// Apply environment variable configuration to the loader.
///
/// Values already set through builder methods are left untouched.
pub fn apply_env(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    if loader.config_path().is_none()
        && let Some(path) = env_var_or_none(CONFIG_PATH_ENV)
    {
        loader.set_config_path(Some(PathBuf::from(path)));
    }
    if loader.default_cluster().is_none()
        && let Some(cluster) = env_var_or_none(CLUSTER_ENV)
    {
        loader.set_default_cluster(Some(cluster));
    }
    if loader.poll_interval().is_none()
        && let Some(value) = env_var_or_none(POLL_INTERVAL_ENV)
    {
        let ms = parse_u64(POLL_INTERVAL_ENV, &value)?;
        loader.set_poll_interval(Some(Duration::from_millis(ms)));
    }
    if loader.stream_timeout().is_none()
        && let Some(value) = env_var_or_none(STREAM_TIMEOUT_ENV)
    {
        let secs = parse_u64(STREAM_TIMEOUT_ENV, &value)?;
        loader.set_stream_timeout(Some(Duration::from_secs(secs)));
    }
    Ok(())
}
