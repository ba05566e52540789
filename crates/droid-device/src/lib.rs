//! # droid-device
//!
//! Android device control for the droid tool server.
//!
//! - **Bridge** — the [`BridgeClient`] / [`DeviceHandle`] seam and device selection
//! - **ADB** — the production bridge, driving the `adb` executable
//! - **Session** — high-level operations against one bound device
//! - **Tools** — the named tool set exposed to MCP hosts
//!
//! A session binds to exactly one device for its whole lifetime.

pub mod adb;
pub mod bridge;
pub mod intents;
pub mod mock;
pub mod screenshot;
pub mod session;
pub mod tools;
pub mod uilayout;

pub use adb::AdbClient;
pub use bridge::{BridgeClient, DeviceHandle, DeviceInfo, DeviceSelection, select_device};
pub use session::{ArtifactPaths, DeviceSession};
pub use tools::{DeviceTools, ShellPolicy};
