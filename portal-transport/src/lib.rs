//! Transport abstraction layer for figure portal communication
//!
//! This crate provides the blocking HID interface the portal session runs on:
//!
//! - `DeviceDiscovery`: enumerate portals by VID/PID and open one
//! - `Transport`: fixed-size output/input report exchange with an open portal
//! - `command`: typed builders for every portal command and response
//!
//! The hidapi backend (`HidDiscovery`) is always available. The `mock`
//! feature adds a scripted in-memory backend.

pub mod command;
pub mod error;
pub mod protocol;
pub mod types;

mod discovery;
mod hid_portal;
mod output_report;

#[cfg(feature = "mock")]
pub mod mock;

pub use command::{
    Activate, ActivateResponse, Deactivate, HandshakeCommand, LightSide, ParseError,
    PortalCommand, PortalResponse, Ready, ReadyResponse, Rgb, SetColor, SetColorExtended,
};
pub use discovery::HidDiscovery;
pub use error::TransportError;
pub use hid_portal::HidPortalTransport;
pub use protocol::{Frame, InputReport, INPUT_REPORT_SIZE, OUTPUT_REPORT_SIZE};
pub use types::{DeviceIdentity, DiscoveredDevice, TransportDeviceInfo};

/// Device discovery abstraction
///
/// Enumeration never opens a device; `open_device` hands out exclusive
/// ownership of the resulting transport.
pub trait DeviceDiscovery: Send {
    /// List currently attached devices matching `vid`/`pid`
    fn list_devices(&self, vid: u16, pid: u16) -> Result<Vec<DiscoveredDevice>, TransportError>;

    /// Open a specific device
    fn open_device(&self, device: &DiscoveredDevice)
        -> Result<Box<dyn Transport>, TransportError>;
}

/// The core transport trait - all backends implement this
///
/// All operations block the calling thread.
pub trait Transport: Send {
    /// Send one 33-byte output report
    ///
    /// Fails with `WriteFailed`/`ShortWrite` unless every byte was accepted.
    fn write_report(&mut self, frame: &Frame) -> Result<(), TransportError>;

    /// Read one 32-byte input report into `buf`
    ///
    /// `buf` is zeroed first; when the backend's read timeout elapses with no
    /// report the call succeeds and `buf` stays all-zero.
    fn read_report(&mut self, buf: &mut InputReport) -> Result<(), TransportError>;

    /// Release the device. Safe to call repeatedly.
    fn close(&mut self);

    /// Whether `close` has not been called yet
    fn is_open(&self) -> bool;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;
}
