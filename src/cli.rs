// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use portal_driver::LightSide;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "portal")]
#[command(author, version, about = "Figure portal HID driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/portal/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Query Commands ===
    /// List attached portals without opening them
    #[command(visible_aliases = ["ls", "l"])]
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Connect and show identity, model and capabilities
    #[command(visible_aliases = ["i"])]
    Info {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration back to the config file
        #[arg(long)]
        write: bool,
    },

    // === Lighting Commands ===
    /// Light the whole portal
    #[command(visible_aliases = ["c"])]
    Color {
        /// Red (0-255)
        r: u8,
        /// Green (0-255)
        g: u8,
        /// Blue (0-255)
        b: u8,
        /// Seconds to stay connected before disconnecting
        #[arg(long, default_value = "0")]
        hold: u64,
    },

    /// Light one side of a dual-side portal with a fade
    #[command(name = "color-ext", visible_aliases = ["cx"])]
    ColorExt {
        /// Which half to light
        #[arg(long, value_enum, default_value = "right")]
        side: SideArg,
        /// Red (0-255)
        r: u8,
        /// Green (0-255)
        g: u8,
        /// Blue (0-255)
        b: u8,
        /// Fade duration in milliseconds
        #[arg(long, default_value = "0")]
        transition_ms: u16,
        /// Seconds to stay connected before disconnecting
        #[arg(long, default_value = "0")]
        hold: u64,
    },

    // === Activation Commands ===
    /// Re-run the activate handshake
    Activate {
        /// Seconds to stay connected before disconnecting
        #[arg(long, default_value = "0")]
        hold: u64,
    },

    /// Turn the portal off
    Deactivate,
}

/// Portal half for `color-ext`
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
pub enum SideArg {
    #[default]
    Right,
    Left,
}

impl From<SideArg> for LightSide {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Right => LightSide::Right,
            SideArg::Left => LightSide::Left,
        }
    }
}
