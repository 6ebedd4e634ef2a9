//! Tests for the configuration loader builder.
//!
//! Responsibilities:
//! - Test loading and defaulting of the TOML config file.
//! - Test environment variable handling and precedence.
//! - Test validation of cluster and search settings.
//!
//! Invariants:
//! - Tests use `serial_test` to prevent environment variable pollution.
//! - Tests use `global_test_lock()` for additional synchronization.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;


/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}

/// Write `contents` to `config.toml` inside `dir` and return its path.
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).expect("write test config");
    path
}

/// Two clusters, `prod` as the default.
pub const TWO_CLUSTERS: &str = r#"
default_cluster = "prod"

[clusters.prod]
url = "https://prod.example.com/"
token = "prod-token"

[clusters.dev]
url = "http://dev.example.com:8080"
token = "dev-token"
skip_ssl_verify = true
"#;
