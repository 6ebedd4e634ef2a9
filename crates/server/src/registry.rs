//! Tool registry: maps tool names to typed async handlers.
//!
//! Responsibilities:
//! - Store tool descriptors (name, description, JSON input schema).
//! - Deserialize call arguments into each handler's parameter type and
//!   serialize its output back to JSON.
//!
//! Does NOT handle:
//! - The host protocol framing (see `protocol` module).
//! - What the tools do (see `tools` module).
//!
//! Invariants:
//! - `list()` returns descriptors in name order.
//! - Null or missing arguments are treated as an empty object.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors returned by [`ToolRegistry::call`].
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidParams { tool: String, message: String },

    /// The tool ran and failed; the message is shown to the caller.
    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    /// Wrap any displayable error as an execution failure.
    pub fn execution(err: impl std::fmt::Display) -> Self {
        Self::Execution(err.to_string())
    }
}

/// Public description of a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Handler,
}

/// Registry of named tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A later registration under the same name replaces the earlier one.
    pub fn register<P, O, F, Fut>(
        &mut self,
        name: &str,
        description: &str,
        input_schema: Value,
        handler: F,
    ) where
        P: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    {
        let tool = name.to_string();
        let handler = Arc::new(handler);
        let erased: Handler = Arc::new(move |arguments: Value| {
            let handler = handler.clone();
            let tool = tool.clone();
            async move {
                let params: P =
                    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidParams {
                        tool,
                        message: e.to_string(),
                    })?;
                let output = handler(params).await?;
                serde_json::to_value(output)
                    .map_err(|e| ToolError::Execution(format!("Failed to serialize result: {}", e)))
            }
            .boxed()
        });

        self.tools.insert(
            name.to_string(),
            RegisteredTool {
                descriptor: ToolDescriptor {
                    name: name.to_string(),
                    description: description.to_string(),
                    input_schema,
                },
                handler: erased,
            },
        );
    }

    /// Descriptors of all registered tools, sorted by name.
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().map(|t| &t.descriptor).collect()
    }

    /// Invoke a tool by name.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        tracing::debug!(tool = name, "Invoking tool");
        (tool.handler)(arguments).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
