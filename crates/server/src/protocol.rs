//! JSON-RPC 2.0 host protocol over line-delimited stdio.
//!
//! Responsibilities:
//! - Read one JSON-RPC message per line and write one response per request.
//! - Serve `initialize`, `ping`, `tools/list` and `tools/call` from a [`ToolRegistry`].
//! - Run requests concurrently and abort them on `notifications/cancelled`.
//!
//! Does NOT handle:
//! - Tool semantics (see `tools` module).
//! - Logging setup. Nothing here writes to stdout except protocol messages.
//!
//! Invariants:
//! - Notifications (no `id`) never get a response.
//! - Each request runs in its own task, so a slow tool call never delays
//!   other requests. Responses are written by a single writer as they finish.
//! - A cancelled request gets no response; its task is aborted, which drops
//!   the tool future.
//! - Tool execution failures are returned as `isError: true` results; unknown
//!   tools and bad arguments are JSON-RPC errors.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::registry::{ToolError, ToolRegistry};

/// Protocol revision advertised in the `initialize` result.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const SERVER_NAME: &str = "humio-mcp";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

const CANCELLED_NOTIFICATION: &str = "notifications/cancelled";

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct CancelledParams {
    #[serde(rename = "requestId")]
    request_id: Value,
}

/// One decoded input line.
enum Incoming {
    /// Malformed input, answered without dispatching.
    Reply(RpcResponse),
    Request {
        id: Value,
        method: String,
        params: Value,
    },
    Notification {
        method: String,
        params: Value,
    },
}

/// Abort handles of running requests, keyed by the request id's JSON text.
type InFlight = Arc<Mutex<HashMap<String, AbortHandle>>>;

fn lock(in_flight: &InFlight) -> MutexGuard<'_, HashMap<String, AbortHandle>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stdio tool server.
pub struct McpServer {
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Serve on the process's stdin and stdout until stdin closes.
    pub async fn run_stdio(&self) -> io::Result<()> {
        info!(tools = self.registry.len(), "Serving tools on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve requests read from `reader`, writing responses to `writer`.
    ///
    /// Requests run concurrently; responses are written in completion order.
    /// Returns once the reader reaches end of input and every running request
    /// has been answered or cancelled.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<RpcResponse>();

        let write_loop = async move {
            while let Some(response) = rx.recv().await {
                write_message(&mut writer, &response).await?;
            }
            Ok::<(), io::Error>(())
        };

        tokio::try_join!(self.read_loop(reader, tx), write_loop)?;
        debug!("Input closed");
        Ok(())
    }

    async fn read_loop<R>(
        &self,
        reader: R,
        tx: mpsc::UnboundedSender<RpcResponse>,
    ) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let in_flight: InFlight = Arc::default();
        let mut tasks = JoinSet::new();
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            while tasks.try_join_next().is_some() {}
            if line.trim().is_empty() {
                continue;
            }
            match parse_message(&line) {
                Incoming::Reply(response) => {
                    let _ = tx.send(response);
                }
                Incoming::Notification { method, params } if method == CANCELLED_NOTIFICATION => {
                    cancel_request(&in_flight, params);
                }
                Incoming::Notification { method, .. } => handle_notification(&method),
                Incoming::Request { id, method, params } => {
                    self.spawn_request(&mut tasks, &in_flight, &tx, id, method, params);
                }
            }
        }

        while tasks.join_next().await.is_some() {}
        Ok(())
    }

    fn spawn_request(
        &self,
        tasks: &mut JoinSet<()>,
        in_flight: &InFlight,
        tx: &mpsc::UnboundedSender<RpcResponse>,
        id: Value,
        method: String,
        params: Value,
    ) {
        let key = id.to_string();
        let task_key = key.clone();
        let registry = self.registry.clone();
        let tx = tx.clone();
        let finished = in_flight.clone();

        // Held across the spawn so the task cannot deregister before it is registered.
        let mut running = lock(in_flight);
        let handle = tasks.spawn(async move {
            let response = dispatch(&registry, id, &method, params).await;
            lock(&finished).remove(&task_key);
            let _ = tx.send(response);
        });
        running.insert(key, handle);
    }

    /// Handle one raw message to completion. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        match parse_message(line) {
            Incoming::Reply(response) => Some(response),
            Incoming::Request { id, method, params } => {
                Some(dispatch(&self.registry, id, &method, params).await)
            }
            Incoming::Notification { method, .. } => {
                handle_notification(&method);
                None
            }
        }
    }
}

fn parse_message(line: &str) -> Incoming {
    let raw: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            warn!("Unparseable message: {}", e);
            return Incoming::Reply(RpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            ));
        }
    };

    let fallback_id = raw.get("id").cloned().unwrap_or(Value::Null);
    let request: RpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => {
            return Incoming::Reply(RpcResponse::failure(
                fallback_id,
                INVALID_REQUEST,
                format!("Invalid request: {}", e),
            ));
        }
    };

    debug!(method = %request.method, "Received message");

    match request.id {
        Some(id) => Incoming::Request {
            id,
            method: request.method,
            params: request.params,
        },
        None => Incoming::Notification {
            method: request.method,
            params: request.params,
        },
    }
}

async fn dispatch(registry: &ToolRegistry, id: Value, method: &str, params: Value) -> RpcResponse {
    match method {
        "initialize" => RpcResponse::success(id, initialize_result()),
        "ping" => RpcResponse::success(id, json!({})),
        "tools/list" => RpcResponse::success(id, json!({ "tools": registry.list() })),
        "tools/call" => handle_tool_call(registry, id, params).await,
        other => RpcResponse::failure(
            id,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", other),
        ),
    }
}

fn handle_notification(method: &str) {
    match method {
        "notifications/initialized" => info!("Client initialized"),
        other => debug!(method = other, "Ignoring notification"),
    }
}

fn cancel_request(in_flight: &InFlight, params: Value) {
    let request_id = match serde_json::from_value::<CancelledParams>(params) {
        Ok(p) => p.request_id.to_string(),
        Err(e) => {
            warn!("Malformed cancellation: {}", e);
            return;
        }
    };

    match lock(in_flight).remove(&request_id) {
        Some(handle) => {
            handle.abort();
            info!(request_id = %request_id, "Request cancelled");
        }
        None => debug!(request_id = %request_id, "No running request to cancel"),
    }
}

async fn handle_tool_call(registry: &ToolRegistry, id: Value, params: Value) -> RpcResponse {
    let call: ToolCallParams = match serde_json::from_value(params) {
        Ok(c) => c,
        Err(e) => {
            return RpcResponse::failure(
                id,
                INVALID_PARAMS,
                format!("Invalid tools/call params: {}", e),
            );
        }
    };

    info!(tool = %call.name, "Tool call");
    match registry.call(&call.name, call.arguments).await {
        Ok(value) => RpcResponse::success(id, tool_result(&value, false)),
        Err(e @ (ToolError::UnknownTool(_) | ToolError::InvalidParams { .. })) => {
            RpcResponse::failure(id, INVALID_PARAMS, e.to_string())
        }
        Err(ToolError::Execution(message)) => {
            warn!(tool = %call.name, "Tool failed: {}", message);
            RpcResponse::success(id, tool_result(&Value::String(message), true))
        }
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

/// Wrap a tool outcome as a single text content block.
///
/// Strings are sent as-is; anything else as pretty-printed JSON.
fn tool_result(value: &Value, is_error: bool) -> Value {
    let text = match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error
    })
}

async fn write_message<W>(writer: &mut W, response: &RpcResponse) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(response).map_err(io::Error::other)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await
}
