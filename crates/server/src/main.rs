//! Humio MCP server - Humio/LogScale tools over stdio.
//!
//! Responsibilities:
//! - Load `.env`, parse arguments, set up logging.
//! - Load and validate the cluster configuration.
//! - Serve tool calls on stdin/stdout until stdin closes.
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing so `.env` can provide clap env defaults.
//! - Startup failures are printed to stderr and exit with code 1.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use humio_config::ConfigLoader;
use humio_mcp::args::Cli;
use humio_mcp::{McpServer, logging, tools};
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Load .env file BEFORE CLI parsing so clap env defaults can read .env values
    ConfigLoader::new()
        .load_dotenv()
        .context("Failed to load environment")?;

    let cli = Cli::parse();
    logging::init(cli.log_format).context("Failed to initialize logging")?;

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config_path() {
        loader = loader.with_config_path(path);
    }
    if let Some(cluster) = cli.cluster() {
        loader = loader.with_default_cluster(cluster);
    }
    let config = loader
        .from_env()
        .context("Failed to load configuration from environment")?
        .build()
        .context("Failed to build configuration")?;

    info!(
        default_cluster = %config.default_cluster,
        clusters = ?config.cluster_names(),
        "Configuration loaded"
    );

    let server = McpServer::new(tools::build_registry(Arc::new(config)));
    server
        .run_stdio()
        .await
        .context("stdio transport failed")?;

    info!("stdin closed, shutting down");
    Ok(())
}
