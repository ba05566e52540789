use thiserror::Error;

/// Unified error type for the droid workspace.
#[derive(Error, Debug)]
pub enum DroidError {
    // ── Device selection errors ────────────────────────────────
    #[error("{0}")]
    Environment(String),

    #[error("No devices connected. Please connect a device and try again.")]
    NoDevice,

    #[error("Device {requested} not found. Available devices: {}", format_serials(.available))]
    DeviceNotFound {
        requested: String,
        available: Vec<String>,
    },

    #[error(
        "Multiple devices connected: {}. Please specify a device in droid.toml or connect only one device.",
        format_serials(.available)
    )]
    AmbiguousDevice { available: Vec<String> },

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    // ── Device operation errors ────────────────────────────────
    #[error("{op} failed: {reason}")]
    Operation { op: String, reason: String },

    // ── Tool errors ────────────────────────────────────────────
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("tool denied by shell policy: {tool}: {reason}")]
    ToolDenied { tool: String, reason: String },

    // ── Transport errors ───────────────────────────────────────
    #[error("transport error: {0}")]
    Transport(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl DroidError {
    /// Shorthand for a failed device operation.
    pub fn operation(op: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Operation {
            op: op.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the errors raised while choosing which device to bind.
    /// These abort startup; everything else is scoped to a single tool call.
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            Self::Environment(_)
                | Self::NoDevice
                | Self::DeviceNotFound { .. }
                | Self::AmbiguousDevice { .. }
        )
    }
}

fn format_serials(serials: &[String]) -> String {
    let quoted: Vec<String> = serials.iter().map(|s| format!("'{s}'")).collect();
    format!("[{}]", quoted.join(", "))
}

pub type Result<T> = std::result::Result<T, DroidError>;
