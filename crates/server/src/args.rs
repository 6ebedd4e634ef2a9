//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//!
//! Non-responsibilities:
//! - Does not load configuration (see `main`).

use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "humio-mcp")]
#[command(about = "Humio/LogScale tool server speaking JSON-RPC on stdio", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (overrides the default search order).
    #[arg(long, env = "HUMIO_MCP_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cluster used when a tool call does not name one.
    #[arg(long, env = "HUMIO_MCP_CLUSTER")]
    pub cluster: Option<String>,

    /// Log output format. Logs always go to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "HUMIO_MCP_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Config path, ignoring blank values so the loader can fall back.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config
            .as_ref()
            .filter(|p| !p.to_string_lossy().trim().is_empty())
            .cloned()
    }

    /// Cluster override, ignoring blank values.
    pub fn cluster(&self) -> Option<String> {
        self.cluster
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}
