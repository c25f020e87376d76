//! Type-safe portal command builders and response parsers
//!
//! Every outbound command is a 33-byte output report `[0x00, opcode, params...]`.
//! Only Ready and Activate are acknowledged: the device answers with an input
//! report whose first byte echoes the opcode.

use std::fmt;

use crate::protocol::{self, activation, cmd, side, Frame};
use crate::types::DeviceIdentity;

// =============================================================================
// Core Traits
// =============================================================================

/// A command that can be serialized to an output report
pub trait PortalCommand {
    /// Opcode byte (e.g., `b'C'` for COLOR)
    const OPCODE: u8;

    /// Serialize parameters (excluding report ID and opcode)
    fn to_data(&self) -> Vec<u8>;

    /// Build the complete 33-byte output report
    fn build(&self) -> Frame {
        protocol::build_command(Self::OPCODE, &self.to_data())
    }
}

/// A command the device acknowledges by echoing its opcode
pub trait HandshakeCommand: PortalCommand {
    /// Response produced once the ack byte matches
    type Response: PortalResponse;
}

/// A response that can be parsed from an input report
pub trait PortalResponse: Sized {
    /// Expected ack byte at position 0
    const ACK: u8;

    /// Minimum response length required
    const MIN_LEN: usize;

    /// Parse from response bytes (starting with the ack byte)
    fn from_data(data: &[u8]) -> Result<Self, ParseError>;

    /// Parse with validation
    fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < Self::MIN_LEN {
            return Err(ParseError::TooShort {
                expected: Self::MIN_LEN,
                got: data.len(),
            });
        }
        if data[0] != Self::ACK {
            return Err(ParseError::AckMismatch {
                expected: Self::ACK,
                got: data[0],
            });
        }
        Self::from_data(data)
    }
}

/// Parse error for responses and wire values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    TooShort { expected: usize, got: usize },
    AckMismatch { expected: u8, got: u8 },
    InvalidValue { field: &'static str, value: u8 },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { expected, got } => {
                write!(
                    f,
                    "Response too short: expected {} bytes, got {}",
                    expected, got
                )
            }
            Self::AckMismatch { expected, got } => {
                write!(
                    f,
                    "Ack mismatch: expected 0x{:02X} ('{}'), got 0x{:02X}",
                    expected, *expected as char, got
                )
            }
            Self::InvalidValue { field, value } => {
                write!(f, "Invalid value for {}: 0x{:02X}", field, value)
            }
        }
    }
}

impl std::error::Error for ParseError {}

// =============================================================================
// Colour types
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Which half of a dual-side portal a COLOR_EXTENDED command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum LightSide {
    #[default]
    Right = side::RIGHT,
    Left = side::LEFT,
}

impl LightSide {
    pub fn wire(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            LightSide::Right => "right",
            LightSide::Left => "left",
        }
    }
}

impl TryFrom<u8> for LightSide {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            side::RIGHT => Ok(LightSide::Right),
            side::LEFT => Ok(LightSide::Left),
            _ => Err(ParseError::InvalidValue {
                field: "side",
                value,
            }),
        }
    }
}

impl fmt::Display for LightSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Ready / Activate
// =============================================================================

/// READY command ('R'), answered with the identity bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct Ready;

impl PortalCommand for Ready {
    const OPCODE: u8 = cmd::READY;

    fn to_data(&self) -> Vec<u8> {
        vec![]
    }
}

impl HandshakeCommand for Ready {
    type Response = ReadyResponse;
}

/// READY response: `[b'R', identity_high, identity_low, ...]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyResponse {
    pub identity: DeviceIdentity,
}

impl PortalResponse for ReadyResponse {
    const ACK: u8 = cmd::READY;
    const MIN_LEN: usize = 3;

    fn from_data(data: &[u8]) -> Result<Self, ParseError> {
        Ok(Self {
            identity: DeviceIdentity::new(data[1], data[2]),
        })
    }
}

/// ACTIVATE command ('A', 0x01)
#[derive(Debug, Clone, Copy, Default)]
pub struct Activate;

impl PortalCommand for Activate {
    const OPCODE: u8 = cmd::ACTIVATE;

    fn to_data(&self) -> Vec<u8> {
        vec![activation::ON]
    }
}

impl HandshakeCommand for Activate {
    type Response = ActivateResponse;
}

/// ACTIVATE acknowledgement; only the ack byte is meaningful
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivateResponse;

impl PortalResponse for ActivateResponse {
    const ACK: u8 = cmd::ACTIVATE;
    const MIN_LEN: usize = 1;

    fn from_data(_data: &[u8]) -> Result<Self, ParseError> {
        Ok(Self)
    }
}

/// ACTIVATE command with 0x00: fire-and-forget, no ack is awaited
#[derive(Debug, Clone, Copy, Default)]
pub struct Deactivate;

impl PortalCommand for Deactivate {
    const OPCODE: u8 = cmd::ACTIVATE;

    fn to_data(&self) -> Vec<u8> {
        vec![activation::OFF]
    }
}

// =============================================================================
// Lighting
// =============================================================================

/// COLOR command ('C'): whole-portal colour
#[derive(Debug, Clone, Copy, Default)]
pub struct SetColor {
    pub color: Rgb,
}

impl SetColor {
    pub fn new(color: Rgb) -> Self {
        Self { color }
    }
}

impl PortalCommand for SetColor {
    const OPCODE: u8 = cmd::COLOR;

    fn to_data(&self) -> Vec<u8> {
        vec![self.color.r, self.color.g, self.color.b]
    }
}

/// COLOR_EXTENDED command ('J'): per-side colour with a fade
///
/// Wire layout: `[side, r, g, b, t_lo, t_hi]` where `t` is the transition
/// time in milliseconds, little-endian. Observed traffic uses `D0 07`
/// (2000 ms) and `F4 01` (500 ms); all-zero turns the side off.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetColorExtended {
    pub side: LightSide,
    pub color: Rgb,
    pub transition_ms: u16,
}

impl SetColorExtended {
    pub fn new(side: LightSide, color: Rgb, transition_ms: u16) -> Self {
        Self {
            side,
            color,
            transition_ms,
        }
    }

    /// Build from raw wire bytes (`u` is the low transition byte)
    pub fn from_raw(side: LightSide, r: u8, g: u8, b: u8, u: u8, duration: u8) -> Self {
        Self {
            side,
            color: Rgb::new(r, g, b),
            transition_ms: u16::from_le_bytes([u, duration]),
        }
    }
}

impl PortalCommand for SetColorExtended {
    const OPCODE: u8 = cmd::COLOR_EXTENDED;

    fn to_data(&self) -> Vec<u8> {
        let [t_lo, t_hi] = self.transition_ms.to_le_bytes();
        vec![
            self.side.wire(),
            self.color.r,
            self.color.g,
            self.color.b,
            t_lo,
            t_hi,
        ]
    }
}
