//! Device tool definitions and executor.
//!
//! Exposes the device session as the named tools an MCP host calls.
//! Follows the `droid-core` `ToolExecutor` pattern.

use async_trait::async_trait;
use droid_config::schema::ShellConfig;
use droid_core::{DroidError, Tool, ToolCall, ToolExecutor, ToolResult};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::DeviceSession;
use crate::session::strip_adb_prefix;

pub const GET_PACKAGES: &str = "get_packages";
pub const EXECUTE_ADB_SHELL_COMMAND: &str = "execute_adb_shell_command";
pub const GET_UILAYOUT: &str = "get_uilayout";
pub const GET_SCREENSHOT: &str = "get_screenshot";
pub const GET_PACKAGE_ACTION_INTENTS: &str = "get_package_action_intents";

/// Characters that would let a command chain past the allowlist.
const SHELL_METACHARACTERS: &[char] = &[';', '&', '|', '`', '$', '>', '<', '\n', '(', ')'];

/// Which executables `execute_adb_shell_command` may run.
#[derive(Debug, Clone, Default)]
pub struct ShellPolicy {
    allowed: Vec<String>,
}

impl ShellPolicy {
    /// No restriction: every command is forwarded.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn allow(commands: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed: commands.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_restricted(&self) -> bool {
        !self.allowed.is_empty()
    }

    /// Check an already prefix-stripped command.
    pub fn check(&self, command: &str) -> droid_core::Result<()> {
        if !self.is_restricted() {
            return Ok(());
        }
        let denied = |reason: String| DroidError::ToolDenied {
            tool: EXECUTE_ADB_SHELL_COMMAND.into(),
            reason,
        };
        if command.contains(SHELL_METACHARACTERS) {
            return Err(denied("shell operators are not allowed when an allowlist is configured".into()));
        }
        let executable = command.split_whitespace().next().unwrap_or_default();
        if self.allowed.iter().any(|a| a == executable) {
            Ok(())
        } else {
            Err(denied(format!(
                "'{executable}' is not in the allowed commands: {}",
                self.allowed.join(", ")
            )))
        }
    }
}

impl From<&ShellConfig> for ShellPolicy {
    fn from(c: &ShellConfig) -> Self {
        Self::allow(c.allowed_commands.iter().cloned())
    }
}

/// Holds the device session and dispatches tool calls to it.
///
/// Calls are serialized: the session's local artifact files are shared.
pub struct DeviceTools {
    session: Arc<Mutex<DeviceSession>>,
    policy: ShellPolicy,
}

impl DeviceTools {
    pub fn new(session: DeviceSession, policy: ShellPolicy) -> Self {
        if policy.is_restricted() {
            info!(allowed = ?policy.allowed, "shell allowlist enabled");
        }
        Self {
            session: Arc::new(Mutex::new(session)),
            policy,
        }
    }

    /// Check if a tool name belongs to this executor.
    pub fn has_tool(name: &str) -> bool {
        matches!(
            name,
            GET_PACKAGES
                | EXECUTE_ADB_SHELL_COMMAND
                | GET_UILAYOUT
                | GET_SCREENSHOT
                | GET_PACKAGE_ACTION_INTENTS
        )
    }

    /// Return all tool definitions.
    pub fn definitions() -> Vec<Tool> {
        vec![
            Tool {
                name: GET_PACKAGES.into(),
                description: "Get all installed packages on the device. Returns one package name per line.".into(),
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            Tool {
                name: EXECUTE_ADB_SHELL_COMMAND.into(),
                description: "Executes an ADB shell command on the device and returns the output. A leading 'adb shell ' or 'adb ' is stripped.".into(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "command": {
                            "type": "string",
                            "description": "The ADB shell command to execute"
                        }
                    },
                    "required": ["command"]
                }),
            },
            Tool {
                name: GET_UILAYOUT.into(),
                description: "Retrieves information about clickable elements in the current UI: text, content description, bounds, and center coordinates of each.".into(),
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            Tool {
                name: GET_SCREENSHOT.into(),
                description: "Takes a screenshot of the device and returns it as a PNG downscaled to 30%.".into(),
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            Tool {
                name: GET_PACKAGE_ACTION_INTENTS.into(),
                description: "Get all non-data actions from the Activity Resolver Table for a package.".into(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "package_name": {
                            "type": "string",
                            "description": "The name of the package to get actions for"
                        }
                    },
                    "required": ["package_name"]
                }),
            },
        ]
    }

    pub fn policy(&self) -> &ShellPolicy {
        &self.policy
    }
}

#[async_trait]
impl ToolExecutor for DeviceTools {
    fn tools(&self) -> Vec<Tool> {
        Self::definitions()
    }

    async fn execute(&self, call: &ToolCall) -> droid_core::Result<ToolResult> {
        let name = call.tool_name.as_str();
        match name {
            GET_PACKAGES => {
                let session = self.session.lock().await;
                let packages = session.list_packages().await?;
                Ok(ToolResult::text(name, packages))
            }
            EXECUTE_ADB_SHELL_COMMAND => {
                let command = require_str(call, "command")?;
                if let Err(e) = self.policy.check(strip_adb_prefix(command)) {
                    warn!(command, "shell command rejected by allowlist");
                    return Err(e);
                }
                let session = self.session.lock().await;
                let output = session.run_shell_command(command).await?;
                Ok(ToolResult::text(name, output))
            }
            GET_UILAYOUT => {
                let session = self.session.lock().await;
                let layout = session.get_ui_layout().await?;
                Ok(ToolResult::text(name, layout))
            }
            GET_SCREENSHOT => {
                let session = self.session.lock().await;
                let path = session.take_screenshot().await?;
                Ok(ToolResult::image(name, path))
            }
            GET_PACKAGE_ACTION_INTENTS => {
                let package_name = require_package_name(call)?;
                let session = self.session.lock().await;
                let actions = session.get_package_action_intents(package_name).await?;
                Ok(ToolResult::list(name, actions))
            }
            _ => Err(DroidError::ToolNotFound(call.tool_name.clone())),
        }
    }
}

// ─── Helpers ──────────────────────────────────────────────────────

/// The `package_name` argument, restricted to the shape of an Android
/// application id so it cannot smuggle extra shell words into `dumpsys`.
fn require_package_name(call: &ToolCall) -> droid_core::Result<&str> {
    let name = require_str(call, "package_name")?;
    if is_package_name(name) {
        Ok(name)
    } else {
        Err(DroidError::InvalidArguments {
            tool: call.tool_name.clone(),
            reason: format!("'{name}' is not a valid package name"),
        })
    }
}

/// `[A-Za-z0-9_.]+`
pub fn is_package_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Extract a required string argument from a tool call.
fn require_str<'a>(call: &'a ToolCall, key: &str) -> droid_core::Result<&'a str> {
    match call.arguments.get(key) {
        Some(v) => v.as_str().ok_or_else(|| DroidError::InvalidArguments {
            tool: call.tool_name.clone(),
            reason: format!("'{key}' must be a string"),
        }),
        None => Err(DroidError::InvalidArguments {
            tool: call.tool_name.clone(),
            reason: format!("missing '{key}' argument"),
        }),
    }
}
