use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration — maps to `droid.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DroidConfig {
    pub device: DeviceConfig,
    pub server: ServerConfig,
    pub shell: ShellConfig,
    pub adb: AdbConfig,
    pub artifacts: ArtifactsConfig,
    pub logging: LoggingConfig,
}

// ── Device ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Serial of the device to bind. Absent, empty or blank means auto-select.
    pub name: Option<String>,
}

impl DeviceConfig {
    /// The pinned serial, trimmed. `None` means auto-select.
    pub fn requested_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

// ── Server ─────────────────────────────────────────────────────

/// Which transport the tool server speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP: one JSON-RPC message per `POST /mcp`.
    Http,
    /// Server-sent events: `GET /sse` + `POST /messages`.
    Sse,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Stdio => "stdio",
            Transport::Http => "http",
            Transport::Sse => "sse",
        }
    }

    pub fn is_network(&self) -> bool {
        !matches!(self, Transport::Stdio)
    }
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" | "streamable-http" => Ok(Transport::Http),
            "sse" => Ok(Transport::Sse),
            other => Err(format!("unknown transport '{other}' (expected stdio, http or sse)")),
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: Transport,
    /// Bind host for the HTTP transports.
    pub host: String,
    /// Bind port for the HTTP transports.
    pub port: u16,
    /// Per-request timeout applied to tool calls on HTTP transports. 0 = none.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            host: "127.0.0.1".into(),
            port: 8000,
            request_timeout_secs: 120,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Shell policy ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Executables `execute_adb_shell_command` may run. Empty = unrestricted.
    pub allowed_commands: Vec<String>,
}

// ── ADB ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdbConfig {
    /// Path to the `adb` executable.
    pub path: PathBuf,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("adb") }
    }
}

// ── Artifacts ──────────────────────────────────────────────────

/// Local files overwritten by the screenshot and UI-dump tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub screenshot: PathBuf,
    pub compressed_screenshot: PathBuf,
    pub ui_dump: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            screenshot: PathBuf::from("screenshot.png"),
            compressed_screenshot: PathBuf::from("compressed_screenshot.png"),
            ui_dump: PathBuf::from("window_dump.xml"),
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty" or "json". Always written to stderr.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
        };
        write!(f, "{} {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl DroidConfig {
    /// Validate the config and return a list of warnings.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Server ───
        if self.server.transport.is_network() && self.server.port == 0 {
            warnings.push(ConfigWarning {
                field: "server.port".into(),
                message: format!("port 0 is not usable with the {} transport", self.server.transport),
                severity: WarningSeverity::Error,
                hint: Some("Set e.g. port = 8000".into()),
            });
        }
        if self.server.transport.is_network() && self.server.host.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "server.host".into(),
                message: "host is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set e.g. host = \"127.0.0.1\"".into()),
            });
        }
        if self.server.transport.is_network()
            && !matches!(self.server.host.as_str(), "127.0.0.1" | "localhost" | "::1")
        {
            warnings.push(ConfigWarning {
                field: "server.host".into(),
                message: format!("listening on {} exposes device control without authentication", self.server.host),
                severity: WarningSeverity::Warning,
                hint: Some("Bind to 127.0.0.1 unless the network is trusted".into()),
            });
        }

        // ── Shell policy ───
        if self
            .shell
            .allowed_commands
            .iter()
            .any(|c| c.trim().is_empty() || c.contains(char::is_whitespace))
        {
            warnings.push(ConfigWarning {
                field: "shell.allowed_commands".into(),
                message: "entries must be single executable names".into(),
                severity: WarningSeverity::Error,
                hint: Some("Use e.g. allowed_commands = [\"ls\", \"input\", \"am\"]".into()),
            });
        }

        // ── ADB ───
        if self.adb.path.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                field: "adb.path".into(),
                message: "adb path is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Leave unset to use `adb` from PATH".into()),
            });
        }

        // ── Artifacts ───
        let a = &self.artifacts;
        if a.screenshot == a.compressed_screenshot {
            warnings.push(ConfigWarning {
                field: "artifacts.compressed_screenshot".into(),
                message: "compressed screenshot path must differ from the raw screenshot path".into(),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }

        // ── Logging ───
        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some("Falling back to 'pretty'".into()),
            });
        }

        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| w.to_string())
            .collect();
        if !errors.is_empty() {
            return Err(errors.join("\n"));
        }
        Ok(warnings)
    }
}
