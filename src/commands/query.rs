//! Query (read-only) command handlers.

use super::{discovery, with_session, CommandResult};
use portal_driver::{DeviceDiscovery, PortalConfig};
use serde_json::json;
use std::path::Path;

/// List attached portals
pub fn list(config: &PortalConfig, json: bool) -> CommandResult {
    let devices = discovery(config)
        .list_devices(config.transport.vendor_id, config.transport.product_id)?;

    if json {
        let infos: Vec<_> = devices.iter().map(|d| &d.info).collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    if devices.is_empty() {
        println!(
            "No portals found ({:04X}:{:04X})",
            config.transport.vendor_id, config.transport.product_id
        );
        return Ok(());
    }
    println!("Found {} portal(s):", devices.len());
    for device in &devices {
        let info = &device.info;
        println!(
            "  {:04X}:{:04X}  {}  {}",
            info.vid,
            info.pid,
            info.product_name.as_deref().unwrap_or("Unknown"),
            info.device_path
        );
    }
    if devices.len() > 1 {
        println!("Only one portal may be connected at a time.");
    }
    Ok(())
}

/// Connect and describe the portal
pub fn info(config: &PortalConfig, json: bool) -> CommandResult {
    with_session(config, |session| {
        let identity = session.identity();
        let model = session.model();
        let capabilities = session.capabilities();

        if json {
            let value = json!({
                "device": session.device_info(),
                "identity": identity.to_string(),
                "model": model.name(),
                "capabilities": capabilities,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        if let Some(info) = session.device_info() {
            println!(
                "Device:       {:04X}:{:04X} {}",
                info.vid, info.pid, info.device_path
            );
            if let Some(name) = &info.product_name {
                println!("Product:      {name}");
            }
        }
        println!("Identity:     {identity}");
        println!("Model:        {model}");
        println!("Capabilities: {capabilities}");
        Ok(())
    })
}

/// Print the effective config, optionally writing it to `path`
pub fn config(config: &PortalConfig, path: &Path, write: bool) -> CommandResult {
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(config)?);
    if write {
        config.save(path)?;
        println!("# written");
    }
    Ok(())
}
