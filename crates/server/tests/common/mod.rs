//! Shared test utilities for humio-mcp integration tests.
//!
//! Responsibilities:
//! - Build in-memory configurations pointing at mock servers.
//! - Provide a hermetic `humio-mcp` command factory.
//!
//! Invariants / Assumptions:
//! - Commands built here never load a local `.env` or inherit HUMIO_MCP_* variables.

use std::collections::BTreeMap;
use std::time::Duration;

use assert_cmd::Command;
use humio_config::{AppConfig, ClusterConfig, SearchSettings};
use secrecy::SecretString;

pub const TEST_TOKEN: &str = "test-token";

/// Configuration with a `primary` (default) and a `secondary` cluster.
#[allow(dead_code)]
pub fn config_for(primary_url: &str, secondary_url: &str) -> AppConfig {
    let mut clusters = BTreeMap::new();
    for (name, url) in [("primary", primary_url), ("secondary", secondary_url)] {
        clusters.insert(
            name.to_string(),
            ClusterConfig::new(name, url, SecretString::new(TEST_TOKEN.to_string().into())),
        );
    }
    AppConfig {
        default_cluster: "primary".to_string(),
        clusters,
        search: SearchSettings {
            poll_interval: Duration::from_millis(10),
            request_timeout: Duration::from_secs(5),
            stream_timeout: Duration::from_secs(5),
            ..SearchSettings::default()
        },
    }
}

/// Returns a hermetic `humio-mcp` command.
#[allow(dead_code)]
pub fn humio_mcp_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("humio-mcp");
    cmd.env("DOTENV_DISABLED", "1");
    for (key, _) in std::env::vars() {
        if key.starts_with("HUMIO_MCP_") {
            cmd.env_remove(&key);
        }
    }
    cmd.env_remove("RUST_LOG");
    cmd
}
