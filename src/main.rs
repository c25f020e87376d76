//! Figure Portal Driver CLI
//!
//! A command-line interface for identifying and lighting figure portals.

use anyhow::Result;
use clap::Parser;
use portal_driver::{PortalConfig, PortalError, Rgb};
use tracing::debug;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<PortalError>() {
            Some(portal_err) => eprintln!("{}: {}", portal_err.kind(), portal_err.message()),
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(PortalConfig::default_path);
    debug!("Loading config from {:?}", config_path);
    let config = PortalConfig::load(&config_path)?;

    match cli.command {
        // Default: show portal info
        None => commands::query::info(&config, false),
        Some(Commands::Info { json }) => commands::query::info(&config, json),
        Some(Commands::List { json }) => commands::query::list(&config, json),
        Some(Commands::Config { write }) => commands::query::config(&config, &config_path, write),

        Some(Commands::Color { r, g, b, hold }) => {
            commands::set::color(&config, Rgb::new(r, g, b), hold)
        }
        Some(Commands::ColorExt {
            side,
            r,
            g,
            b,
            transition_ms,
            hold,
        }) => commands::set::color_ext(
            &config,
            side.into(),
            Rgb::new(r, g, b),
            transition_ms,
            hold,
        ),
        Some(Commands::Activate { hold }) => commands::set::activate(&config, hold),
        Some(Commands::Deactivate) => commands::set::deactivate(&config),
    }
}
