//! Configuration loader for the TOML config file and environment variables.
//!
//! Responsibilities:
//! - Discover and parse `config.toml`.
//! - Provide a builder-pattern `ConfigLoader` for hierarchical configuration merging.
//! - Enforce `DOTENV_DISABLED` gate to prevent accidental dotenv loading in tests.
//!
//! Invariants / Assumptions:
//! - Environment variables take precedence over config file values.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.

mod builder;
mod env;
mod error;
mod file;

pub use builder::ConfigLoader;
pub use env::{CLUSTER_ENV, POLL_INTERVAL_ENV, STREAM_TIMEOUT_ENV, env_var_or_none};
pub use error::ConfigError;

#[cfg(test)]
mod tests;
