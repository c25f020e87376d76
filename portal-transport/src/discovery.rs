//! Device discovery for portals via hidapi

use std::ffi::CString;

use hidapi::HidApi;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::hid_portal::HidPortalTransport;
use crate::output_report::OutputChannel;
use crate::protocol::timing;
use crate::types::{DiscoveredDevice, TransportDeviceInfo};
use crate::{DeviceDiscovery, Transport};

/// HID device discovery
pub struct HidDiscovery {
    /// Read timeout handed to every opened transport (ms, -1 blocks)
    read_timeout_ms: i32,
}

impl Default for HidDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl HidDiscovery {
    /// Create a new HID discovery instance
    pub fn new() -> Self {
        Self {
            read_timeout_ms: timing::DEFAULT_READ_TIMEOUT_MS,
        }
    }

    /// Use `ms` as the read timeout of opened transports (-1 = block forever)
    pub fn with_read_timeout(mut self, ms: i32) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    fn api() -> Result<HidApi, TransportError> {
        HidApi::new().map_err(TransportError::from)
    }
}

impl DeviceDiscovery for HidDiscovery {
    fn list_devices(&self, vid: u16, pid: u16) -> Result<Vec<DiscoveredDevice>, TransportError> {
        let api = Self::api()?;

        let devices: Vec<DiscoveredDevice> = api
            .device_list()
            .filter(|d| d.vendor_id() == vid && d.product_id() == pid)
            .map(|d| {
                let path = d.path().to_string_lossy().to_string();
                debug!("Found portal: VID={:04X} PID={:04X} path={}", vid, pid, path);
                DiscoveredDevice {
                    info: TransportDeviceInfo {
                        vid,
                        pid,
                        device_path: path,
                        serial: d.serial_number().map(|s| s.to_string()),
                        product_name: d.product_string().map(|s| s.to_string()),
                        manufacturer: d.manufacturer_string().map(|s| s.to_string()),
                    },
                }
            })
            .collect();

        info!("Found {} portal(s)", devices.len());
        Ok(devices)
    }

    fn open_device(
        &self,
        device: &DiscoveredDevice,
    ) -> Result<Box<dyn Transport>, TransportError> {
        let path = &device.info.device_path;
        let open_failed = |reason: String| TransportError::OpenFailed {
            path: path.clone(),
            reason,
        };

        let c_path = CString::new(path.as_str()).map_err(|e| open_failed(e.to_string()))?;
        let api = Self::api()?;
        let hid = api
            .open_path(&c_path)
            .map_err(|e| open_failed(e.to_string()))?;
        let output = OutputChannel::open(path).map_err(|e| open_failed(e.to_string()))?;

        info!(
            "Opened portal {:04X}:{:04X} at {}",
            device.info.vid, device.info.pid, path
        );

        Ok(Box::new(HidPortalTransport::new(
            hid,
            output,
            device.info.clone(),
            self.read_timeout_ms,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::device;

    #[test]
    #[ignore] // requires hidapi access to the host
    fn test_list_devices() {
        // Passes with or without a portal attached
        let result = HidDiscovery::new().list_devices(device::VENDOR_ID, device::PRODUCT_ID);
        assert!(result.is_ok());
    }

    #[test]
    fn test_read_timeout_builder() {
        let discovery = HidDiscovery::new().with_read_timeout(timing::READ_BLOCKING);
        assert_eq!(discovery.read_timeout_ms, -1);
        assert_eq!(
            HidDiscovery::default().read_timeout_ms,
            timing::DEFAULT_READ_TIMEOUT_MS
        );
    }
}
