//! Protocol constants and frame helpers for portal communication

/// Command opcodes (ASCII, carried in byte 1 of every output report)
pub mod cmd {
    /// Ready / identify: the response carries the two identity bytes
    pub const READY: u8 = b'R';
    /// Activate (param 0x01) or deactivate (param 0x00)
    pub const ACTIVATE: u8 = b'A';
    /// Single-colour illumination
    pub const COLOR: u8 = b'C';
    /// Per-side illumination with transition time
    pub const COLOR_EXTENDED: u8 = b'J';

    /// Get human-readable name for an opcode
    pub fn name(cmd: u8) -> &'static str {
        match cmd {
            READY => "READY",
            ACTIVATE => "ACTIVATE",
            COLOR => "COLOR",
            COLOR_EXTENDED => "COLOR_EXTENDED",
            _ => "UNKNOWN",
        }
    }
}

/// Parameter byte for the ACTIVATE opcode
pub mod activation {
    pub const ON: u8 = 0x01;
    pub const OFF: u8 = 0x00;
}

/// Side selector for COLOR_EXTENDED
pub mod side {
    pub const RIGHT: u8 = 0x00;
    pub const LEFT: u8 = 0x02;
}

/// Output report: report id + 32 payload bytes
pub const OUTPUT_REPORT_SIZE: usize = 33;
/// Input report: 32 bytes, byte 0 is the ack/echo byte
pub const INPUT_REPORT_SIZE: usize = 32;
/// Report id slot of every output report (the portal uses unnumbered reports)
pub const REPORT_ID: u8 = 0x00;

/// Fixed-size outbound frame
pub type Frame = [u8; OUTPUT_REPORT_SIZE];
/// Fixed-size inbound frame
pub type InputReport = [u8; INPUT_REPORT_SIZE];

/// Device identification constants
pub mod device {
    /// Portal vendor ID
    pub const VENDOR_ID: u16 = 0x1430;
    /// Portal product ID (shared by every portal generation)
    pub const PRODUCT_ID: u16 = 0x0150;
}

/// HID communication timing constants
pub mod timing {
    /// Block on reads until a report arrives
    pub const READ_BLOCKING: i32 = -1;
    /// Default read timeout (ms); a timed-out read yields an all-zero report
    pub const DEFAULT_READ_TIMEOUT_MS: i32 = 500;
}

/// Build an output report
///
/// Format: `[report_id=0] [opcode] [data...] [zero padding]`
pub fn build_command(cmd: u8, data: &[u8]) -> Frame {
    let mut buf = [0u8; OUTPUT_REPORT_SIZE];
    buf[0] = REPORT_ID;
    buf[1] = cmd;
    let len = std::cmp::min(data.len(), OUTPUT_REPORT_SIZE - 2);
    buf[2..2 + len].copy_from_slice(&data[..len]);
    buf
}

/// Format the meaningful head of a report for logging
///
/// Trailing zero bytes are dropped so idle padding does not flood the log.
pub fn describe_report(buf: &[u8]) -> String {
    let end = buf.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    let head: Vec<String> = buf[..end].iter().map(|b| format!("{b:02X}")).collect();
    if head.is_empty() {
        "<empty>".to_string()
    } else {
        head.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_command_layout() {
        let buf = build_command(cmd::ACTIVATE, &[activation::ON]);
        assert_eq!(buf.len(), OUTPUT_REPORT_SIZE);
        assert_eq!(buf[0], REPORT_ID);
        assert_eq!(buf[1], b'A');
        assert_eq!(buf[2], 0x01);
        assert!(buf[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_build_command_truncates_oversized_data() {
        let data = [0xFFu8; 40];
        let buf = build_command(cmd::COLOR, &data);
        assert_eq!(buf[1], cmd::COLOR);
        assert!(buf[2..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_describe_report_trims_padding() {
        let buf = build_command(cmd::COLOR, &[10, 20, 30]);
        assert_eq!(describe_report(&buf), "00 43 0A 14 1E");
        assert_eq!(describe_report(&[0u8; 32]), "<empty>");
    }

    #[test]
    fn test_cmd_names() {
        assert_eq!(cmd::name(b'R'), "READY");
        assert_eq!(cmd::name(b'J'), "COLOR_EXTENDED");
        assert_eq!(cmd::name(b'Z'), "UNKNOWN");
    }
}
