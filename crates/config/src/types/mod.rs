//! Configuration type definitions for the Humio MCP server.
//!
//! Responsibilities:
//! - Define per-cluster connection settings and the application config.
//! - Define search tuning settings (polling, timeouts, streaming retries).
//!
//! Does NOT handle:
//! - Configuration loading from files or environment variables (see `loader` module).
//! - Actual network connections (see client crate).
//!
//! Invariants:
//! - Cluster tokens use `secrecy::SecretString` to prevent accidental logging.
//! - `AppConfig::default_cluster` always names an entry of `AppConfig::clusters`.

mod cluster;
mod search;

pub use cluster::{AppConfig, ClusterConfig};
pub use search::{SearchSettings, SearchStrategy};
