use droid_config::DroidConfig;
use droid_core::DroidError;
use droid_device::{AdbClient, BridgeClient};

pub(super) async fn cmd_devices(config: &DroidConfig) -> droid_core::Result<()> {
    let adb = AdbClient::new(config.adb.path.clone());
    if !adb.is_installed().await {
        return Err(DroidError::Environment(format!(
            "{} is not installed or not in PATH",
            config.adb.path.display()
        )));
    }

    let devices = adb.list_devices().await?;
    if devices.is_empty() {
        println!("No devices connected.");
        return Ok(());
    }

    let pinned = config.device.requested_name();
    for d in &devices {
        let marker = if pinned.as_deref() == Some(d.serial.as_str()) {
            " (configured)"
        } else {
            ""
        };
        match d.model {
            Some(ref model) => println!("{}\t{}\t{}{}", d.serial, d.state, model, marker),
            None => println!("{}\t{}{}", d.serial, d.state, marker),
        }
    }
    Ok(())
}
