//! Session error types
//!
//! Every failure is exposed as `(ErrorKind, message)` so a presentation layer
//! can decide how to surface it.

use std::error::Error as _;
use std::fmt;
use std::time::Duration;

use portal_transport::TransportError;
use thiserror::Error;

/// Failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoDeviceFound,
    AmbiguousDevice,
    OpenFailed,
    WriteFailed,
    ReadFailed,
    HandshakeTimeout,
}

impl ErrorKind {
    /// Short headline suitable for a dialog title
    pub fn title(&self) -> &'static str {
        match self {
            Self::NoDeviceFound => "Portal not found",
            Self::AmbiguousDevice => "Multiple portals found",
            Self::OpenFailed => "Failed to open portal",
            Self::WriteFailed => "Failed to write to portal",
            Self::ReadFailed => "Failed to read from portal",
            Self::HandshakeTimeout => "Portal not responding",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Errors from session operations
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("No portal was found. Please make sure one is connected.")]
    NoDeviceFound,

    /// Enumeration itself failed (e.g. the HID backend could not start)
    #[error("Could not enumerate portals")]
    Enumeration(#[source] TransportError),

    #[error("{count} portals were found. Please make sure only one portal is connected.")]
    AmbiguousDevice { count: usize },

    #[error("Failed to open the portal at {path}")]
    OpenFailed {
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("Failed to write to the portal")]
    WriteFailed(#[source] TransportError),

    #[error("Failed to read from the portal")]
    ReadFailed(#[source] TransportError),

    #[error("Portal did not acknowledge {command} after {attempts} attempt(s) in {elapsed:?}")]
    HandshakeTimeout {
        command: &'static str,
        attempts: u32,
        elapsed: Duration,
    },
}

impl PortalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoDeviceFound | Self::Enumeration(_) => ErrorKind::NoDeviceFound,
            Self::AmbiguousDevice { .. } => ErrorKind::AmbiguousDevice,
            Self::OpenFailed { .. } => ErrorKind::OpenFailed,
            Self::WriteFailed(_) => ErrorKind::WriteFailed,
            Self::ReadFailed(_) => ErrorKind::ReadFailed,
            Self::HandshakeTimeout { .. } => ErrorKind::HandshakeTimeout,
        }
    }

    /// Human-readable text including the underlying transport cause
    pub fn message(&self) -> String {
        match self.source() {
            Some(source) => format!("{self}: {source}"),
            None => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(PortalError::NoDeviceFound.kind(), ErrorKind::NoDeviceFound);
        assert_eq!(
            PortalError::Enumeration(TransportError::HidError("x".into())).kind(),
            ErrorKind::NoDeviceFound
        );
        assert_eq!(
            PortalError::AmbiguousDevice { count: 2 }.kind(),
            ErrorKind::AmbiguousDevice
        );
        assert_eq!(
            PortalError::WriteFailed(TransportError::Closed).kind(),
            ErrorKind::WriteFailed
        );
        assert_eq!(
            PortalError::HandshakeTimeout {
                command: "READY",
                attempts: 3,
                elapsed: Duration::from_millis(10),
            }
            .kind(),
            ErrorKind::HandshakeTimeout
        );
    }

    #[test]
    fn test_message_includes_cause() {
        let err = PortalError::WriteFailed(TransportError::WriteFailed("pipe broken".into()));
        assert_eq!(
            err.message(),
            "Failed to write to the portal: Write failed: pipe broken"
        );
        assert_eq!(
            PortalError::NoDeviceFound.message(),
            "No portal was found. Please make sure one is connected."
        );
    }

    #[test]
    fn test_titles() {
        assert_eq!(ErrorKind::NoDeviceFound.title(), "Portal not found");
        assert_eq!(ErrorKind::AmbiguousDevice.to_string(), "Multiple portals found");
    }
}
