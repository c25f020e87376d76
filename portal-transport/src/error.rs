//! Transport error types

use thiserror::Error;

use crate::command::ParseError;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Short write: expected {expected} bytes, device accepted {written}")]
    ShortWrite { expected: usize, written: usize },

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] ParseError),

    #[error("Transport is closed")]
    Closed,

    // HID-specific errors
    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") || msg.contains("EACCES") {
            TransportError::HidPermissionDenied(msg)
        } else {
            TransportError::HidError(msg)
        }
    }
}
