// Figure portal driver - shared library
// Session state machine, capability table and configuration

pub mod capability;
pub mod config;
pub mod error;
pub mod handshake;
pub mod outbox;
pub mod session;

pub use capability::{CapabilitySet, PortalModel};
pub use config::{ConfigError, PortalConfig};
pub use error::{ErrorKind, PortalError};
pub use handshake::HandshakePolicy;
pub use outbox::{Observer, SessionEvent};
pub use session::{Session, SessionConfig, SessionState};

pub use portal_transport::{
    DeviceDiscovery, DeviceIdentity, HidDiscovery, LightSide, Rgb, Transport,
    TransportDeviceInfo, TransportError,
};
