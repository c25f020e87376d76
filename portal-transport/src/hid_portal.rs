//! HID transport implementation for an attached portal

use hidapi::HidDevice;
use tracing::{debug, trace};

use crate::error::TransportError;
use crate::output_report::OutputChannel;
use crate::protocol::{self, cmd, Frame, InputReport, OUTPUT_REPORT_SIZE};
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// HID transport for a USB portal
///
/// Reads go through hidapi's interrupt-IN path; writes use the per-OS
/// output channel.
pub struct HidPortalTransport {
    /// `None` once closed
    device: Option<HidDevice>,
    output: OutputChannel,
    info: TransportDeviceInfo,
    /// Read timeout (ms, -1 blocks)
    read_timeout_ms: i32,
}

impl HidPortalTransport {
    pub(crate) fn new(
        device: HidDevice,
        output: OutputChannel,
        info: TransportDeviceInfo,
        read_timeout_ms: i32,
    ) -> Self {
        Self {
            device: Some(device),
            output,
            info,
            read_timeout_ms,
        }
    }

    /// Set the read timeout (ms, -1 blocks)
    pub fn set_read_timeout(&mut self, ms: i32) {
        self.read_timeout_ms = ms;
    }
}

impl Transport for HidPortalTransport {
    fn write_report(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let device = self.device.as_ref().ok_or(TransportError::Closed)?;
        debug!(
            "Writing {} report: {}",
            cmd::name(frame[1]),
            protocol::describe_report(frame)
        );

        let written = self.output.send(device, frame)?;
        if written != OUTPUT_REPORT_SIZE {
            return Err(TransportError::ShortWrite {
                expected: OUTPUT_REPORT_SIZE,
                written,
            });
        }
        Ok(())
    }

    fn read_report(&mut self, buf: &mut InputReport) -> Result<(), TransportError> {
        let device = self.device.as_ref().ok_or(TransportError::Closed)?;
        buf.fill(0);

        let n = device
            .read_timeout(buf, self.read_timeout_ms)
            .map_err(|e| TransportError::ReadFailed(e.to_string()))?;
        if n == 0 {
            trace!("Read timed out after {} ms", self.read_timeout_ms);
        } else {
            debug!("Read {} bytes: {}", n, protocol::describe_report(&buf[..n]));
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.device.take().is_some() {
            self.output.close();
            debug!("Closed portal at {}", self.info.device_path);
        }
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }
}

impl Drop for HidPortalTransport {
    fn drop(&mut self) {
        self.close();
    }
}
