//! Command handlers for the CLI application.
//!
//! - `query`: read-only commands (list, info, config)
//! - `set`: commands that drive the portal (color, color-ext, activate, deactivate)

pub mod query;
pub mod set;

use portal_driver::{HidDiscovery, PortalConfig, Session};
use std::time::Duration;
use tracing::info;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// HID discovery using the configured read timeout
pub fn discovery(config: &PortalConfig) -> HidDiscovery {
    HidDiscovery::new().with_read_timeout(config.transport.read_timeout_ms)
}

/// Connect to the single attached portal and run a closure with the session.
/// The session disconnects when it goes out of scope.
pub fn with_session<F>(config: &PortalConfig, f: F) -> CommandResult
where
    F: FnOnce(&mut Session) -> CommandResult,
{
    let mut session = Session::new(Box::new(discovery(config)), config.session_config());
    session.connect()?;
    f(&mut session)
}

/// Keep the session open for `secs` seconds
pub fn hold(secs: u64) {
    if secs > 0 {
        info!("Holding connection for {secs}s");
        std::thread::sleep(Duration::from_secs(secs));
    }
}
