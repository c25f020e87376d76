//! Scripted in-memory portal backend
//!
//! `MockPortal` is a cloneable handle onto shared device state, so a test can
//! keep one clone while the session owns the transport built from another.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::PortalResponse;
use crate::error::TransportError;
use crate::protocol::{cmd, Frame, InputReport, INPUT_REPORT_SIZE};
use crate::types::{DeviceIdentity, DiscoveredDevice, TransportDeviceInfo};
use crate::{ActivateResponse, DeviceDiscovery, ReadyResponse, Transport};

#[derive(Default)]
struct MockState {
    responses: VecDeque<InputReport>,
    written: Vec<Frame>,
    opens: usize,
    open: bool,
    fail_writes: bool,
    fail_reads: bool,
    reads: usize,
}

/// Shared state of a simulated portal
#[derive(Clone, Default)]
pub struct MockPortal {
    state: Arc<Mutex<MockState>>,
}

impl MockPortal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw input report (zero-padded to 32 bytes)
    pub fn push_response(&self, data: &[u8]) {
        let mut report = [0u8; INPUT_REPORT_SIZE];
        let len = data.len().min(INPUT_REPORT_SIZE);
        report[..len].copy_from_slice(&data[..len]);
        self.state.lock().responses.push_back(report);
    }

    /// Queue a Ready acknowledgement carrying `identity`
    pub fn respond_ready(&self, identity: DeviceIdentity) {
        self.push_response(&[ReadyResponse::ACK, identity.high(), identity.low()]);
    }

    /// Queue an Activate acknowledgement
    pub fn respond_activate(&self) {
        self.push_response(&[ActivateResponse::ACK]);
    }

    /// Queue the two acknowledgements a successful connect consumes
    pub fn script_connect(&self, identity: DeviceIdentity) {
        self.respond_ready(identity);
        self.respond_activate();
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Make every subsequent read fail
    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// Every frame successfully written so far
    pub fn written(&self) -> Vec<Frame> {
        self.state.lock().written.clone()
    }

    /// Opcodes of the written frames, in order
    pub fn written_opcodes(&self) -> Vec<u8> {
        self.state.lock().written.iter().map(|f| f[1]).collect()
    }

    pub fn clear_written(&self) {
        self.state.lock().written.clear();
    }

    /// How many times a transport was opened on this portal
    pub fn open_count(&self) -> usize {
        self.state.lock().opens
    }

    /// Whether a transport is currently open
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Number of read calls served
    pub fn read_count(&self) -> usize {
        self.state.lock().reads
    }

    /// Queued responses not yet consumed
    pub fn pending_responses(&self) -> usize {
        self.state.lock().responses.len()
    }
}

/// Discovery that reports `count` identical portals backed by one `MockPortal`
pub struct MockDiscovery {
    portal: MockPortal,
    devices: Vec<DiscoveredDevice>,
    fail_open: bool,
    fail_enumeration: bool,
}

impl MockDiscovery {
    pub fn new(portal: MockPortal, count: usize) -> Self {
        let devices = (0..count)
            .map(|i| DiscoveredDevice {
                info: TransportDeviceInfo::from_path(
                    crate::protocol::device::VENDOR_ID,
                    crate::protocol::device::PRODUCT_ID,
                    format!("mock:{i}"),
                ),
            })
            .collect();
        Self {
            portal,
            devices,
            fail_open: false,
            fail_enumeration: false,
        }
    }

    /// Make `open_device` fail
    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Make `list_devices` fail
    pub fn fail_enumeration(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }
}

impl DeviceDiscovery for MockDiscovery {
    fn list_devices(&self, vid: u16, pid: u16) -> Result<Vec<DiscoveredDevice>, TransportError> {
        if self.fail_enumeration {
            return Err(TransportError::HidError("mock enumeration failure".into()));
        }
        Ok(self
            .devices
            .iter()
            .filter(|d| d.info.vid == vid && d.info.pid == pid)
            .cloned()
            .collect())
    }

    fn open_device(
        &self,
        device: &DiscoveredDevice,
    ) -> Result<Box<dyn Transport>, TransportError> {
        if self.fail_open {
            return Err(TransportError::OpenFailed {
                path: device.info.device_path.clone(),
                reason: "mock open failure".into(),
            });
        }
        {
            let mut state = self.portal.state.lock();
            state.opens += 1;
            state.open = true;
        }
        Ok(Box::new(MockTransport {
            portal: self.portal.clone(),
            info: device.info.clone(),
            open: true,
        }))
    }
}

/// Transport handed out by `MockDiscovery`
pub struct MockTransport {
    portal: MockPortal,
    info: TransportDeviceInfo,
    open: bool,
}

impl Transport for MockTransport {
    fn write_report(&mut self, frame: &Frame) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        let mut state = self.portal.state.lock();
        if state.fail_writes {
            return Err(TransportError::WriteFailed(format!(
                "mock write failure ({})",
                cmd::name(frame[1])
            )));
        }
        state.written.push(*frame);
        Ok(())
    }

    fn read_report(&mut self, buf: &mut InputReport) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        let mut state = self.portal.state.lock();
        state.reads += 1;
        if state.fail_reads {
            return Err(TransportError::ReadFailed("mock read failure".into()));
        }
        // An empty script behaves like a read timeout
        *buf = state.responses.pop_front().unwrap_or([0u8; INPUT_REPORT_SIZE]);
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.portal.state.lock().open = false;
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::device;
    use crate::{PortalCommand, Ready};

    #[test]
    fn test_mock_round_trip() {
        let portal = MockPortal::new();
        portal.respond_ready(DeviceIdentity::new(0x01, 0x29));
        let discovery = MockDiscovery::new(portal.clone(), 1);

        let devices = discovery
            .list_devices(device::VENDOR_ID, device::PRODUCT_ID)
            .unwrap();
        assert_eq!(devices.len(), 1);

        let mut transport = discovery.open_device(&devices[0]).unwrap();
        assert!(portal.is_open());
        transport.write_report(&Ready.build()).unwrap();

        let mut buf = [0u8; INPUT_REPORT_SIZE];
        transport.read_report(&mut buf).unwrap();
        assert_eq!(&buf[..3], &[b'R', 0x01, 0x29]);

        // Script exhausted: reads look like timeouts
        transport.read_report(&mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));

        transport.close();
        transport.close();
        assert!(!portal.is_open());
        assert_eq!(portal.written_opcodes(), vec![b'R']);
    }

    #[test]
    fn test_mock_filters_by_ids() {
        let discovery = MockDiscovery::new(MockPortal::new(), 2);
        assert!(discovery.list_devices(0x1234, 0x5678).unwrap().is_empty());
    }
}
