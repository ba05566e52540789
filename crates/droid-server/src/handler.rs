//! MCP method dispatch on top of a [`ToolExecutor`].

use base64::Engine;
use droid_core::{ToolCall, ToolExecutor, ToolOutput, ToolResult};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::protocol::*;

/// Server-side MCP session logic shared by every transport.
pub struct McpHandler {
    executor: Arc<dyn ToolExecutor>,
    /// Applied around each `tools/call` when set.
    call_timeout: Option<Duration>,
}

impl McpHandler {
    pub fn new(executor: Arc<dyn ToolExecutor>) -> Self {
        Self {
            executor,
            call_timeout: None,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Handle one raw JSON-RPC message. `None` when no reply is due.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparsable JSON-RPC message");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::new(PARSE_ERROR, format!("parse error: {e}")),
                ));
            }
        };
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(req) => self.handle(req).await,
            Err(e) => Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::new(INVALID_REQUEST, format!("invalid request: {e}")),
            )),
        }
    }

    /// Handle a parsed request or notification.
    pub async fn handle(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %req.method, id = ?req.id, "mcp request");

        if req.is_notification() {
            // notifications/initialized, notifications/cancelled, ...
            debug!(method = %req.method, "notification received");
            return None;
        }
        let id = req.id.clone().unwrap_or(Value::Null);

        let outcome = match req.method.as_str() {
            "initialize" => Ok(self.initialize(&req.params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(&req.params).await,
            other => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            )),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn initialize(&self, params: &Value) -> Value {
        let requested = params["protocolVersion"].as_str().unwrap_or_default();
        let version = if SUPPORTED_PROTOCOL_VERSIONS.contains(&requested) {
            requested
        } else {
            MCP_PROTOCOL_VERSION
        };
        let client = params["clientInfo"]["name"].as_str().unwrap_or("unknown");
        info!(client, protocol = version, "mcp client initialized");

        json!({
            "protocolVersion": version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": {
                "name": "droid",
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    fn list_tools(&self) -> Value {
        json!({ "tools": self.executor.tools() })
    }

    async fn call_tool(&self, params: &Value) -> Result<Value, JsonRpcError> {
        let name = params["name"]
            .as_str()
            .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "tools/call requires a 'name'"))?;
        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(args @ Value::Object(_)) => args.clone(),
            Some(_) => {
                return Err(JsonRpcError::new(
                    INVALID_PARAMS,
                    "tools/call 'arguments' must be an object",
                ));
            }
        };
        let call = ToolCall::new(name, arguments);

        let started = std::time::Instant::now();
        let result = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.executor.execute(&call)).await {
                Ok(r) => r,
                Err(_) => {
                    warn!(tool = name, ?limit, "tool call timed out");
                    return Ok(error_content(&format!(
                        "{name} timed out after {}s",
                        limit.as_secs()
                    )));
                }
            },
            None => self.executor.execute(&call).await,
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(result) => {
                info!(tool = name, elapsed_ms, "tool call succeeded");
                Ok(render_result(result).await)
            }
            Err(e) => {
                warn!(tool = name, elapsed_ms, error = %e, "tool call failed");
                Ok(error_content(&e.to_string()))
            }
        }
    }
}

/// Convert a tool result into MCP `CallToolResult` JSON.
async fn render_result(result: ToolResult) -> Value {
    match result.output {
        ToolOutput::Text { text } => json!({
            "content": [{ "type": "text", "text": text }],
            "isError": false,
        }),
        ToolOutput::List { items } => {
            let content: Vec<Value> = items
                .iter()
                .map(|item| json!({ "type": "text", "text": item }))
                .collect();
            json!({
                "content": content,
                "structuredContent": { "result": items },
                "isError": false,
            })
        }
        ToolOutput::Image { path } => match tokio::fs::read(&path).await {
            Ok(bytes) => json!({
                "content": [{
                    "type": "image",
                    "data": base64::engine::general_purpose::STANDARD.encode(&bytes),
                    "mimeType": "image/png",
                }],
                "isError": false,
            }),
            Err(e) => error_content(&format!("failed to read {}: {e}", path.display())),
        },
    }
}

fn error_content(message: &str) -> Value {
    json!({
        "content": [{ "type": "text", "text": message }],
        "isError": true,
    })
}
