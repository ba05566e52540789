use std::sync::Arc;
use tracing::{error, info};

use droid_config::DroidConfig;
use droid_device::{AdbClient, ArtifactPaths, DeviceSession, DeviceTools, ShellPolicy};

pub(super) async fn cmd_serve(config: DroidConfig) -> droid_core::Result<()> {
    let adb = AdbClient::new(config.adb.path.clone());
    let requested = config.device.requested_name();

    // Selection failures surface here, before any transport is opened
    let (session, selection) = DeviceSession::connect(
        &adb,
        requested.as_deref(),
        ArtifactPaths::from(config.artifacts.clone()),
    )
    .await
    .inspect_err(|e| {
        if e.is_selection() {
            error!(adb = %config.adb.path.display(), "device selection failed");
        }
    })?;

    let policy = ShellPolicy::from(&config.shell);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        device = %selection.serial,
        transport = %config.server.transport,
        shell_restricted = policy.is_restricted(),
        "droid ready"
    );

    let tools = DeviceTools::new(session, policy);
    droid_server::serve(&config.server, Arc::new(tools)).await
}
