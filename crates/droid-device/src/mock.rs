//! In-memory bridge for deterministic testing.
//!
//! Serves pre-configured shell output and device files without touching adb.

use async_trait::async_trait;
use droid_core::{DroidError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::bridge::{BridgeClient, DeviceHandle, DeviceInfo};

#[derive(Default)]
struct MockState {
    /// Exact command → output (or error message).
    shell: HashMap<String, std::result::Result<String, String>>,
    /// Remote path → file contents.
    files: HashMap<String, Vec<u8>>,
    /// Every shell command received, in order.
    commands: Vec<String>,
}

/// A mock bridge that returns pre-configured device output.
///
/// # Example
/// ```
/// use droid_device::mock::MockBridge;
/// let bridge = MockBridge::with_devices(&["emulator-5554"])
///     .with_shell("pm list packages", "package:com.android.settings\n");
/// ```
pub struct MockBridge {
    installed: bool,
    devices: Vec<DeviceInfo>,
    list_error: Option<String>,
    state: Arc<Mutex<MockState>>,
    /// Serials passed to `bind`, for assertions in tests.
    pub bound: Arc<Mutex<Vec<String>>>,
}

impl MockBridge {
    pub fn with_devices(serials: &[&str]) -> Self {
        Self {
            installed: true,
            devices: serials.iter().map(|s| DeviceInfo::new(*s)).collect(),
            list_error: None,
            state: Arc::new(Mutex::new(MockState::default())),
            bound: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Pretend the adb executable is missing.
    pub fn not_installed(mut self) -> Self {
        self.installed = false;
        self
    }

    /// Make device enumeration fail.
    pub fn with_list_error(mut self, msg: &str) -> Self {
        self.list_error = Some(msg.to_string());
        self
    }

    /// Reply to `cmd` with `output`.
    pub fn with_shell(self, cmd: &str, output: &str) -> Self {
        self.lock()
            .shell
            .insert(cmd.to_string(), Ok(output.to_string()));
        self
    }

    /// Fail `cmd` with an operation error carrying `msg`.
    pub fn with_shell_error(self, cmd: &str, msg: &str) -> Self {
        self.lock()
            .shell
            .insert(cmd.to_string(), Err(msg.to_string()));
        self
    }

    /// Make `remote` pullable with these contents.
    pub fn with_file(self, remote: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.lock().files.insert(remote.to_string(), contents.into());
        self
    }

    /// Shell commands issued so far, across every bound handle.
    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl BridgeClient for MockBridge {
    async fn is_installed(&self) -> bool {
        self.installed
    }

    async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        match self.list_error {
            Some(ref msg) => Err(DroidError::operation("devices", msg)),
            None => Ok(self.devices.clone()),
        }
    }

    fn bind(&self, serial: &str) -> Arc<dyn DeviceHandle> {
        self.bound
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(serial.to_string());
        Arc::new(MockDevice {
            serial: serial.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

/// A device handle backed by [`MockBridge`] state.
pub struct MockDevice {
    serial: String,
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl DeviceHandle for MockDevice {
    fn serial(&self) -> &str {
        &self.serial
    }

    async fn shell(&self, cmd: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.commands.push(cmd.to_string());
        match state.shell.get(cmd) {
            Some(Ok(out)) => Ok(out.clone()),
            Some(Err(msg)) => Err(DroidError::operation("shell", msg)),
            None => Ok(String::new()),
        }
    }

    async fn pull(&self, remote: &str, local: &Path) -> Result<()> {
        let contents = {
            let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.files.get(remote).cloned()
        };
        match contents {
            Some(bytes) => {
                tokio::fs::write(local, bytes).await?;
                Ok(())
            }
            None => Err(DroidError::operation(
                "pull",
                format!("{remote}: remote object does not exist"),
            )),
        }
    }
}
