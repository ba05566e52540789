//! Android device control via the `adb` executable.
//!
//! # Requirements
//!
//! ADB must be installed and on PATH (or configured via `[adb] path`).
//! On macOS: `brew install android-platform-tools`.

use async_trait::async_trait;
use droid_core::{DroidError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tracing::debug;

use crate::bridge::{BridgeClient, DeviceHandle, DeviceInfo};

// ─── Client ──────────────────────────────────────────────────────

/// Bridge client backed by the `adb` command-line tool.
#[derive(Debug, Clone)]
pub struct AdbClient {
    adb_path: PathBuf,
}

impl Default for AdbClient {
    fn default() -> Self {
        Self::new("adb")
    }
}

impl AdbClient {
    pub fn new(adb_path: impl Into<PathBuf>) -> Self {
        Self {
            adb_path: adb_path.into(),
        }
    }

    /// Run an ADB command (optionally targeting a serial) and return raw output.
    async fn run(&self, serial: Option<&str>, args: &[&str]) -> Result<std::process::Output> {
        let mut cmd = tokio::process::Command::new(&self.adb_path);

        if let Some(serial) = serial {
            cmd.arg("-s").arg(serial);
        }
        // A cancelled call must not leave adb touching the shared artifacts
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

        debug!(adb = %self.adb_path.display(), ?serial, ?args, "running adb");

        cmd.output().await.map_err(|e| {
            DroidError::operation(
                args.first().copied().unwrap_or("adb"),
                format!(
                    "could not run {}: {e}. Install with: brew install android-platform-tools",
                    self.adb_path.display()
                ),
            )
        })
    }

    /// Run an ADB command and return stdout, failing on a nonzero exit.
    async fn adb(&self, serial: Option<&str>, args: &[&str]) -> Result<String> {
        let output = self.run(serial, args).await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(DroidError::operation(
                args.first().copied().unwrap_or("adb"),
                format!("ADB error: {}", stderr.trim()),
            ))
        }
    }
}

#[async_trait]
impl BridgeClient for AdbClient {
    async fn is_installed(&self) -> bool {
        tokio::process::Command::new(&self.adb_path)
            .arg("version")
            .kill_on_drop(true)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let output = self.adb(None, &["devices", "-l"]).await?;
        Ok(parse_devices_output(&output))
    }

    fn bind(&self, serial: &str) -> Arc<dyn DeviceHandle> {
        Arc::new(AdbDevice {
            client: self.clone(),
            serial: serial.to_string(),
        })
    }
}

/// Parse the output of `adb devices -l`.
pub fn parse_devices_output(output: &str) -> Vec<DeviceInfo> {
    let mut devices = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        // Header and daemon start-up chatter
        if line.is_empty() || line.starts_with("List of devices") || line.starts_with('*') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 2 {
            let model = parts
                .iter()
                .find_map(|p| p.strip_prefix("model:"))
                .map(str::to_string);

            devices.push(DeviceInfo {
                serial: parts[0].to_string(),
                state: parts[1].to_string(),
                model,
            });
        }
    }

    devices
}

// ─── Bound device ────────────────────────────────────────────────

/// One device reached through `adb -s <serial>`.
#[derive(Debug)]
pub struct AdbDevice {
    client: AdbClient,
    serial: String,
}

#[async_trait]
impl DeviceHandle for AdbDevice {
    fn serial(&self) -> &str {
        &self.serial
    }

    async fn shell(&self, cmd: &str) -> Result<String> {
        let output = self.client.run(Some(&self.serial), &["shell", cmd]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        // adb itself reports transport problems as "error: ..." / "adb: ..."
        if !output.status.success()
            && stdout.is_empty()
            && (stderr.starts_with("error:") || stderr.starts_with("adb:"))
        {
            return Err(DroidError::operation("shell", stderr.trim()));
        }

        // The command's own output is returned as-is, stderr included
        let mut out = stdout.into_owned();
        out.push_str(&stderr);
        Ok(out)
    }

    async fn pull(&self, remote: &str, local: &Path) -> Result<()> {
        let local = local.to_string_lossy();
        self.client
            .adb(Some(&self.serial), &["pull", remote, &local])
            .await
            .map(|_| ())
            .map_err(|e| match e {
                DroidError::Operation { reason, .. } => DroidError::Operation {
                    op: "pull".into(),
                    reason: format!("{remote}: {reason}"),
                },
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_devices_output() {
        let out = "List of devices attached\n\
                   emulator-5554          device product:sdk_gphone64 model:sdk_gphone64_arm64 device:emu64a transport_id:1\n\
                   R58M1234ABC            unauthorized usb:1-1 transport_id:2\n\n";
        let devices = parse_devices_output(out);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].serial, "emulator-5554");
        assert_eq!(devices[0].state, "device");
        assert_eq!(devices[0].model.as_deref(), Some("sdk_gphone64_arm64"));
        assert_eq!(devices[1].serial, "R58M1234ABC");
        assert_eq!(devices[1].state, "unauthorized");
        assert!(devices[1].model.is_none());
    }

    #[test]
    fn test_parse_devices_skips_daemon_chatter() {
        let out = "* daemon not running; starting now at tcp:5037\n\
                   * daemon started successfully\n\
                   List of devices attached\n\
                   192.168.1.20:5555 device\n";
        let devices = parse_devices_output(out);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].serial, "192.168.1.20:5555");
    }

    #[test]
    fn test_parse_devices_empty() {
        assert!(parse_devices_output("List of devices attached\n\n").is_empty());
    }

    #[tokio::test]
    async fn test_missing_executable_is_not_installed() {
        let client = AdbClient::new("/nonexistent/path/to/adb");
        assert!(!client.is_installed().await);
    }

    #[tokio::test]
    async fn test_missing_executable_list_devices_errors() {
        let client = AdbClient::new("/nonexistent/path/to/adb");
        let err = client.list_devices().await.unwrap_err();
        assert!(matches!(err, DroidError::Operation { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancelled_shell_kills_adb() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("still-running");
        let script = dir.path().join("fake-adb");
        std::fs::write(
            &script,
            format!("#!/bin/sh\nsleep 1\ntouch '{}'\n", marker.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let device = AdbClient::new(&script).bind("emulator-5554");
        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            device.shell("screencap -p /sdcard/screenshot.png"),
        )
        .await;
        assert!(outcome.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }
}
