//! Humio MCP server library.
//!
//! Exposes Humio/LogScale dashboards and searches as tools over a
//! line-delimited JSON-RPC protocol on stdio. The binary in `main.rs` wires
//! configuration, logging and the stdio transport together.

pub mod args;
pub mod logging;
pub mod protocol;
pub mod registry;
pub mod tools;

pub use protocol::McpServer;
pub use registry::{ToolDescriptor, ToolError, ToolRegistry};
