//! The bridge seam: how the session reaches a device.
//!
//! [`BridgeClient`] enumerates devices and binds one; [`DeviceHandle`] is the
//! bound device's shell-exec and file-pull primitives. Production code uses
//! [`crate::AdbClient`]; tests use [`crate::mock::MockBridge`].

use async_trait::async_trait;
use droid_core::{DroidError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A device as reported by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub serial: String,
    /// Bridge-reported state: "device", "offline", "unauthorized", ...
    pub state: String,
    pub model: Option<String>,
}

impl DeviceInfo {
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            state: "device".into(),
            model: None,
        }
    }
}

/// Enumerates devices and binds one.
#[async_trait]
pub trait BridgeClient: Send + Sync {
    /// Whether the bridge tooling is usable at all. Never errors.
    async fn is_installed(&self) -> bool;

    /// Connected devices in the order the bridge reports them.
    async fn list_devices(&self) -> Result<Vec<DeviceInfo>>;

    /// Bind a handle to one device.
    fn bind(&self, serial: &str) -> Arc<dyn DeviceHandle>;
}

/// One bound device.
#[async_trait]
pub trait DeviceHandle: Send + Sync {
    fn serial(&self) -> &str;

    /// Run a shell command on the device and return its output.
    async fn shell(&self, cmd: &str) -> Result<String>;

    /// Copy a file from the device to the local filesystem.
    async fn pull(&self, remote: &str, local: &Path) -> Result<()>;
}

/// Outcome of device selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSelection {
    pub serial: String,
    /// True when no device was requested and the only connected one was taken.
    pub auto_selected: bool,
}

impl DeviceSelection {
    /// Notice emitted on auto-selection.
    pub fn notice(&self) -> Option<String> {
        self.auto_selected.then(|| {
            format!(
                "No device specified, automatically selected: {}",
                self.serial
            )
        })
    }
}

/// Serials of every connected device, in bridge order.
pub async fn list_available_devices(client: &dyn BridgeClient) -> Result<Vec<String>> {
    Ok(client
        .list_devices()
        .await?
        .into_iter()
        .map(|d| d.serial)
        .collect())
}

/// Choose the device to bind.
///
/// An empty or blank `requested` behaves like `None`.
pub async fn select_device(
    client: &dyn BridgeClient,
    requested: Option<&str>,
) -> Result<DeviceSelection> {
    if !client.is_installed().await {
        return Err(DroidError::Environment(
            "adb is not installed or not in PATH. Please install adb and ensure it is in your PATH."
                .into(),
        ));
    }

    let available = list_available_devices(client).await?;
    if available.is_empty() {
        return Err(DroidError::NoDevice);
    }

    let requested = requested.map(str::trim).filter(|r| !r.is_empty());
    let selection = match requested {
        Some(name) => {
            if !available.iter().any(|s| s == name) {
                return Err(DroidError::DeviceNotFound {
                    requested: name.to_string(),
                    available,
                });
            }
            DeviceSelection {
                serial: name.to_string(),
                auto_selected: false,
            }
        }
        None if available.len() == 1 => DeviceSelection {
            serial: available[0].clone(),
            auto_selected: true,
        },
        None => return Err(DroidError::AmbiguousDevice { available }),
    };

    match selection.notice() {
        Some(notice) => info!(serial = %selection.serial, "{notice}"),
        None => info!(serial = %selection.serial, "using configured device"),
    }
    Ok(selection)
}
