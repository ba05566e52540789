//! The device session: high-level operations against one bound device.

use droid_config::schema::ArtifactsConfig;
use droid_core::{DroidError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::bridge::{BridgeClient, DeviceHandle, DeviceSelection, select_device};
use crate::{intents, screenshot, uilayout};

const REMOTE_SCREENSHOT: &str = "/sdcard/screenshot.png";
const REMOTE_UI_DUMP: &str = "/sdcard/window_dump.xml";

/// Local files the session overwrites on every screenshot / UI dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub screenshot: PathBuf,
    pub compressed_screenshot: PathBuf,
    pub ui_dump: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        ArtifactsConfig::default().into()
    }
}

impl From<ArtifactsConfig> for ArtifactPaths {
    fn from(c: ArtifactsConfig) -> Self {
        Self {
            screenshot: c.screenshot,
            compressed_screenshot: c.compressed_screenshot,
            ui_dump: c.ui_dump,
        }
    }
}

/// Owns the handle of the one device this process controls.
pub struct DeviceSession {
    device: Arc<dyn DeviceHandle>,
    artifacts: ArtifactPaths,
}

impl DeviceSession {
    /// Select a device through `client` and bind to it.
    pub async fn connect(
        client: &dyn BridgeClient,
        requested: Option<&str>,
        artifacts: ArtifactPaths,
    ) -> Result<(Self, DeviceSelection)> {
        let selection = select_device(client, requested).await?;
        let device = client.bind(&selection.serial);
        info!(serial = %selection.serial, "device session bound");
        Ok((Self::new(device, artifacts), selection))
    }

    /// Wrap an already-bound handle.
    pub fn new(device: Arc<dyn DeviceHandle>, artifacts: ArtifactPaths) -> Self {
        Self { device, artifacts }
    }

    pub fn serial(&self) -> &str {
        self.device.serial()
    }

    pub fn artifacts(&self) -> &ArtifactPaths {
        &self.artifacts
    }

    /// Installed package names, one per line.
    pub async fn list_packages(&self) -> Result<String> {
        let output = self.device.shell("pm list packages").await?;
        Ok(strip_package_prefixes(&output))
    }

    /// Run a shell command, tolerating a leading `adb shell ` / `adb `.
    pub async fn run_shell_command(&self, raw: &str) -> Result<String> {
        let command = strip_adb_prefix(raw);
        debug!(command, "executing shell command");
        self.device.shell(command).await
    }

    /// Capture, pull and downsample a screenshot. Returns the compressed PNG path.
    pub async fn take_screenshot(&self) -> Result<PathBuf> {
        self.device
            .shell(&format!("screencap -p {REMOTE_SCREENSHOT}"))
            .await?;
        self.device
            .pull(REMOTE_SCREENSHOT, &self.artifacts.screenshot)
            .await?;
        self.device.shell(&format!("rm {REMOTE_SCREENSHOT}")).await?;

        let raw = self.artifacts.screenshot.clone();
        let out = self.artifacts.compressed_screenshot.clone();
        let (width, height) =
            tokio::task::spawn_blocking(move || screenshot::compress_screenshot(&raw, &out))
                .await
                .map_err(|e| DroidError::operation("screenshot", e))??;

        debug!(width, height, "screenshot compressed");
        Ok(self.artifacts.compressed_screenshot.clone())
    }

    /// Clickable elements of the current screen that carry a label.
    pub async fn get_ui_layout(&self) -> Result<String> {
        self.device.shell("uiautomator dump").await?;
        self.device.pull(REMOTE_UI_DUMP, &self.artifacts.ui_dump).await?;
        self.device.shell(&format!("rm {REMOTE_UI_DUMP}")).await?;

        let xml = tokio::fs::read_to_string(&self.artifacts.ui_dump)
            .await
            .map_err(|e| {
                DroidError::operation(
                    "uilayout",
                    format!("failed to read {}: {e}", self.artifacts.ui_dump.display()),
                )
            })?;
        let elements = uilayout::parse_clickable_elements(&xml)
            .map_err(|e| DroidError::operation("uilayout", format!("invalid UI dump: {e}")))?;

        Ok(uilayout::format_ui_layout(&elements))
    }

    /// Non-data action intents registered by `package_name`.
    pub async fn get_package_action_intents(&self, package_name: &str) -> Result<Vec<String>> {
        let output = self
            .device
            .shell(&format!("dumpsys package {package_name}"))
            .await?;
        Ok(intents::parse_action_intents(&output))
    }
}

/// Drop the 8-character `package:` prefix from each line of `pm list packages`.
///
/// The prefix is not checked: shorter lines come out empty.
pub fn strip_package_prefixes(output: &str) -> String {
    output
        .trim()
        .split('\n')
        .map(|line| line.chars().skip("package:".len()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip a leading `adb shell ` (10 chars) or else `adb ` (4 chars).
pub fn strip_adb_prefix(raw: &str) -> &str {
    raw.strip_prefix("adb shell ")
        .or_else(|| raw.strip_prefix("adb "))
        .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_package_prefixes() {
        assert_eq!(strip_package_prefixes("package:a\npackage:bb\n"), "a\nbb");
    }

    #[test]
    fn test_strip_package_prefixes_short_lines_truncate() {
        assert_eq!(strip_package_prefixes("package:a\npkg\n"), "a\n");
        assert_eq!(strip_package_prefixes(""), "");
    }

    #[test]
    fn test_strip_adb_prefix() {
        assert_eq!(strip_adb_prefix("adb shell ls"), "ls");
        assert_eq!(strip_adb_prefix("adb version"), "version");
        assert_eq!(strip_adb_prefix("ls"), "ls");
        assert_eq!(strip_adb_prefix("adb shell"), "shell");
        assert_eq!(strip_adb_prefix("adbd"), "adbd");
    }
}
