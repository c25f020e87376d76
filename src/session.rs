//! Portal session state machine
//!
//! ```text
//!              connect() ok
//! Disconnected ─────────────► Connected
//!      ▲                          │
//!      └──────────────────────────┘
//!   disconnect() / failed write / drop
//! ```
//!
//! The session owns the only open transport. Identity and capabilities are
//! non-default only while `Connected`. All calls block the caller's thread.

use std::fmt;

use portal_transport::protocol::{cmd, device, InputReport, INPUT_REPORT_SIZE};
use portal_transport::{
    Activate, ActivateResponse, Deactivate, DeviceDiscovery, DeviceIdentity, Frame,
    HandshakeCommand, LightSide, PortalCommand, PortalResponse, Ready, Rgb, SetColor,
    SetColorExtended, Transport, TransportDeviceInfo, TransportError,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::capability::{self, CapabilitySet, PortalModel};
use crate::error::PortalError;
use crate::handshake::HandshakePolicy;
use crate::outbox::{Outbox, SessionEvent};

/// Connection state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connected => f.write_str("connected"),
        }
    }
}

/// Session parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    pub handshake: HandshakePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            vendor_id: device::VENDOR_ID,
            product_id: device::PRODUCT_ID,
            handshake: HandshakePolicy::default(),
        }
    }
}

/// A connection to at most one portal
pub struct Session {
    discovery: Box<dyn DeviceDiscovery>,
    config: SessionConfig,
    state: SessionState,
    transport: Option<Box<dyn Transport>>,
    identity: DeviceIdentity,
    capabilities: CapabilitySet,
    outbox: Outbox,
}

impl Session {
    /// Create a disconnected session
    pub fn new(discovery: Box<dyn DeviceDiscovery>, config: SessionConfig) -> Self {
        Self {
            discovery,
            config,
            state: SessionState::Disconnected,
            transport: None,
            identity: DeviceIdentity::ZERO,
            capabilities: CapabilitySet::NONE,
            outbox: Outbox::new(),
        }
    }

    // === State ===

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Identity bytes from the last Ready handshake (zero when disconnected)
    pub fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    pub fn model(&self) -> PortalModel {
        if self.is_connected() {
            capability::model(self.identity)
        } else {
            PortalModel::Unknown
        }
    }

    /// Info of the open device, if any
    pub fn device_info(&self) -> Option<&TransportDeviceInfo> {
        self.transport.as_ref().map(|t| t.device_info())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // === Notifications ===

    /// Register a callback run synchronously after every state change
    pub fn add_observer<F>(&mut self, observer: F)
    where
        F: Fn(&SessionEvent) + Send + 'static,
    {
        self.outbox.add_observer(observer);
    }

    /// Receive state changes on another thread
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.outbox.subscribe()
    }

    // === Lifecycle ===

    /// Find the single attached portal, identify it and activate it
    ///
    /// On any failure the session stays `Disconnected` and no handle is kept
    /// open. Calling this while already connected does nothing.
    pub fn connect(&mut self) -> Result<(), PortalError> {
        if self.is_connected() {
            debug!("connect() while already connected");
            return Ok(());
        }

        let devices = self
            .discovery
            .list_devices(self.config.vendor_id, self.config.product_id)
            .map_err(PortalError::Enumeration)?;

        let device = match devices.as_slice() {
            [] => {
                warn!(
                    "No portal found ({:04X}:{:04X})",
                    self.config.vendor_id, self.config.product_id
                );
                return Err(PortalError::NoDeviceFound);
            }
            [device] => device,
            _ => {
                warn!("{} portals found, refusing to pick one", devices.len());
                return Err(PortalError::AmbiguousDevice {
                    count: devices.len(),
                });
            }
        };

        let path = device.info.device_path.clone();
        let mut transport =
            self.discovery
                .open_device(device)
                .map_err(|source| PortalError::OpenFailed {
                    path: path.clone(),
                    source,
                })?;

        let identity = match self.identify_and_activate(transport.as_mut()) {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Handshake with {} failed: {}", path, e);
                transport.close();
                return Err(e);
            }
        };

        self.identity = identity;
        self.capabilities = capability::resolve(identity);
        self.transport = Some(transport);
        self.state = SessionState::Connected;

        info!(
            "Connected to {} portal at {} (id {}, capabilities: {})",
            capability::model(identity),
            path,
            identity,
            self.capabilities
        );
        self.outbox.emit(SessionEvent::StateChanged {
            state: SessionState::Connected,
        });
        Ok(())
    }

    /// Drop the connection
    ///
    /// Capabilities are cleared, a best-effort Deactivate is sent, the
    /// identity is cleared and the handle closed. Does nothing (and emits
    /// nothing) when already disconnected.
    pub fn disconnect(&mut self) {
        if !self.is_connected() {
            self.identity = DeviceIdentity::ZERO;
            self.capabilities = CapabilitySet::NONE;
            return;
        }

        self.capabilities = CapabilitySet::NONE;
        if let Some(transport) = self.transport.as_mut() {
            if let Err(e) = transport.write_report(&Deactivate.build()) {
                debug!("Deactivate during disconnect failed: {}", e);
            }
        }
        self.identity = DeviceIdentity::ZERO;
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.state = SessionState::Disconnected;

        info!("Disconnected from portal");
        self.outbox.emit(SessionEvent::StateChanged {
            state: SessionState::Disconnected,
        });
    }

    // === Commands ===

    /// Write one raw frame
    ///
    /// No-op while disconnected. A failed write tears the session down and
    /// the failure is returned.
    pub fn send_command(&mut self, frame: &Frame) -> Result<(), PortalError> {
        if !self.is_connected() {
            return Ok(());
        }
        let Some(transport) = self.transport.as_mut() else {
            return Ok(());
        };

        match transport.write_report(frame) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(
                    "Failed to write {} to the portal, disconnecting: {}",
                    cmd::name(frame[1]),
                    e
                );
                self.disconnect();
                Err(PortalError::WriteFailed(e))
            }
        }
    }

    /// Build and write a typed command
    pub fn send<C: PortalCommand>(&mut self, command: &C) -> Result<(), PortalError> {
        self.send_command(&command.build())
    }

    /// Read one response; `true` means its ack byte is not `expected`
    ///
    /// Always `false` while disconnected.
    pub fn check_response(&mut self, expected: u8) -> Result<bool, PortalError> {
        if !self.is_connected() {
            return Ok(false);
        }
        let Some(transport) = self.transport.as_mut() else {
            return Ok(false);
        };

        let mut report: InputReport = [0u8; INPUT_REPORT_SIZE];
        transport
            .read_report(&mut report)
            .map_err(PortalError::ReadFailed)?;
        Ok(report[0] != expected)
    }

    /// Re-run the Activate handshake on a connected portal
    pub fn activate(&mut self) -> Result<(), PortalError> {
        let frame = Activate.build();
        let expected = ActivateResponse::ACK;
        let mut budget = self.config.handshake.start();

        loop {
            budget.record_attempt();
            self.send_command(&frame)?;
            if !self.check_response(expected)? {
                return Ok(());
            }
            if budget.exhausted() {
                return Err(PortalError::HandshakeTimeout {
                    command: cmd::name(Activate::OPCODE),
                    attempts: budget.attempts(),
                    elapsed: budget.elapsed(),
                });
            }
        }
    }

    /// Turn the portal off (fire-and-forget)
    pub fn deactivate(&mut self) -> Result<(), PortalError> {
        self.send(&Deactivate)
    }

    /// Light the whole portal
    pub fn set_color(&mut self, color: Rgb) -> Result<(), PortalError> {
        self.send(&SetColor::new(color))
    }

    /// Light one side of the portal, fading over `transition_ms`
    pub fn set_color_extended(
        &mut self,
        side: LightSide,
        color: Rgb,
        transition_ms: u16,
    ) -> Result<(), PortalError> {
        self.send(&SetColorExtended::new(side, color, transition_ms))
    }

    // === Handshakes ===

    fn identify_and_activate(
        &self,
        transport: &mut dyn Transport,
    ) -> Result<DeviceIdentity, PortalError> {
        let ready = self.handshake(transport, &Ready)?;
        debug!(
            "Portal identified as {} ({})",
            ready.identity,
            capability::model(ready.identity)
        );
        self.handshake(transport, &Activate)?;
        Ok(ready.identity)
    }

    /// Send `command` and read until the device echoes its ack byte
    fn handshake<C: HandshakeCommand>(
        &self,
        transport: &mut dyn Transport,
        command: &C,
    ) -> Result<C::Response, PortalError> {
        let frame = command.build();
        let ack = C::Response::ACK;
        let mut budget = self.config.handshake.start();

        loop {
            budget.record_attempt();
            transport
                .write_report(&frame)
                .map_err(PortalError::WriteFailed)?;

            let mut report: InputReport = [0u8; INPUT_REPORT_SIZE];
            transport
                .read_report(&mut report)
                .map_err(PortalError::ReadFailed)?;

            if report[0] == ack {
                debug!(
                    "{} acknowledged after {} attempt(s)",
                    cmd::name(C::OPCODE),
                    budget.attempts()
                );
                return C::Response::parse(&report)
                    .map_err(|e| PortalError::ReadFailed(TransportError::from(e)));
            }

            debug!(
                "{} attempt {}: got 0x{:02X}, waiting for 0x{:02X}",
                cmd::name(C::OPCODE),
                budget.attempts(),
                report[0],
                ack
            );
            if budget.exhausted() {
                return Err(PortalError::HandshakeTimeout {
                    command: cmd::name(C::OPCODE),
                    attempts: budget.attempts(),
                    elapsed: budget.elapsed(),
                });
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.is_connected() {
            debug!("Session dropped while connected, disconnecting");
            self.disconnect();
        }
    }
}
