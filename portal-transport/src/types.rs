//! Common types for the transport layer

use std::fmt;

use serde::Serialize;

/// Device identification information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// OS device path as reported by enumeration
    pub device_path: String,
    /// Serial number if available
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
    /// Manufacturer name if available
    pub manufacturer: Option<String>,
}

impl TransportDeviceInfo {
    /// Info for a device known only by its path
    pub fn from_path(vid: u16, pid: u16, device_path: impl Into<String>) -> Self {
        Self {
            vid,
            pid,
            device_path: device_path.into(),
            serial: None,
            product_name: None,
            manufacturer: None,
        }
    }
}

/// Discovered device that can be opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredDevice {
    /// Device information
    pub info: TransportDeviceInfo,
}

/// Two identity bytes returned in the Ready response
///
/// `[high, low]`; all-zero means "no device identified".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceIdentity(pub [u8; 2]);

impl DeviceIdentity {
    /// Cleared identity (no device)
    pub const ZERO: Self = Self([0, 0]);

    pub const fn new(high: u8, low: u8) -> Self {
        Self([high, low])
    }

    pub fn high(&self) -> u8 {
        self.0[0]
    }

    pub fn low(&self) -> u8 {
        self.0[1]
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}:{:02X}", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_display() {
        assert_eq!(DeviceIdentity::new(0x02, 0x1B).to_string(), "02:1B");
        assert_eq!(DeviceIdentity::ZERO.to_string(), "00:00");
    }

    #[test]
    fn test_identity_default_is_zero() {
        assert!(DeviceIdentity::default().is_zero());
        assert!(!DeviceIdentity::new(0x01, 0x29).is_zero());
    }
}
