//! Portal control command handlers.

use super::{hold, with_session, CommandResult};
use portal_driver::{LightSide, PortalConfig, Rgb};
use tracing::warn;

/// Light the whole portal
pub fn color(config: &PortalConfig, color: Rgb, hold_secs: u64) -> CommandResult {
    with_session(config, |session| {
        if !session.capabilities().supports_lighting {
            warn!("{} portal does not report lighting support", session.model());
        }
        session.set_color(color)?;
        println!("Color set to {color}");
        hold(hold_secs);
        Ok(())
    })
}

/// Light one side of the portal
pub fn color_ext(
    config: &PortalConfig,
    side: LightSide,
    color: Rgb,
    transition_ms: u16,
    hold_secs: u64,
) -> CommandResult {
    with_session(config, |session| {
        if !session.capabilities().supports_dual_side_lighting {
            warn!(
                "{} portal does not report dual-side lighting support",
                session.model()
            );
        }
        session.set_color_extended(side, color, transition_ms)?;
        println!("{side} side set to {color} over {transition_ms} ms");
        hold(hold_secs);
        Ok(())
    })
}

/// Run the activate handshake again
pub fn activate(config: &PortalConfig, hold_secs: u64) -> CommandResult {
    with_session(config, |session| {
        session.activate()?;
        println!("Portal activated");
        hold(hold_secs);
        Ok(())
    })
}

/// Turn the portal off
pub fn deactivate(config: &PortalConfig) -> CommandResult {
    with_session(config, |session| {
        session.deactivate()?;
        println!("Portal deactivated");
        Ok(())
    })
}
