//! Configuration management for the Humio MCP server.
//!
//! This crate provides types and loaders for Humio/LogScale cluster
//! configuration from a TOML file and environment variables.

pub mod constants;
mod loader;
pub mod types;

pub use loader::{
    CLUSTER_ENV, ConfigError, ConfigLoader, POLL_INTERVAL_ENV, STREAM_TIMEOUT_ENV,
    env_var_or_none,
};
pub use types::{AppConfig, ClusterConfig, SearchSettings, SearchStrategy};
