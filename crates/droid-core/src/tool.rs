use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Description of a tool that a host can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Unique name, e.g. "get_packages".
    pub name: String,
    /// Human-readable description shown to the host.
    pub description: String,
    /// JSON Schema of the arguments object.
    pub input_schema: Value,
}

/// A request from the host to call a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Shape of a successful tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolOutput {
    Text { text: String },
    List { items: Vec<String> },
    /// A PNG on local disk. Transports read and encode it on the way out.
    Image { path: PathBuf },
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_name: String,
    pub output: ToolOutput,
}

impl ToolResult {
    pub fn text(tool_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            output: ToolOutput::Text { text: text.into() },
        }
    }

    pub fn list(tool_name: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            output: ToolOutput::List { items },
        }
    }

    pub fn image(tool_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            tool_name: tool_name.into(),
            output: ToolOutput::Image { path: path.into() },
        }
    }
}

/// Trait implemented by anything that can execute tool calls.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// List all tools this executor provides.
    fn tools(&self) -> Vec<Tool>;

    /// Execute a single tool call and return the result.
    async fn execute(&self, call: &ToolCall) -> crate::Result<ToolResult>;
}
