//! Pixel Multiverse LED daemon CLI
//!
//! Drives the LED bridge from launcher events posted into a named pipe.

use clap::Parser;
use tracing_subscriber::EnvFilter;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let paths = commands::daemon_paths(&cli);

    match cli.command {
        None | Some(Commands::Run) => {
            commands::run(&paths, cli.port.clone())?;
        }
        Some(Commands::Send {
            ref event,
            ref system,
            ref rom,
        }) => {
            commands::utility::send(&paths.fifo, event, system.as_deref(), rom.as_deref())?;
        }
        Some(Commands::Ports) => {
            commands::utility::ports(cli.port.clone());
        }
        Some(Commands::CheckConfig) => {
            commands::utility::check_config(&paths.config)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(env.as_deref(), verbose)?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// `RUST_LOG` when set, else info for our crates; `-v` forces debug.
fn log_filter(env: Option<&str>, verbose: bool) -> anyhow::Result<EnvFilter> {
    match env.filter(|e| !e.trim().is_empty()) {
        Some(directives) if !verbose => Ok(EnvFilter::try_new(directives)?),
        _ => {
            let level = if verbose { "debug" } else { "info" };
            Ok(EnvFilter::try_new(format!(
                "pm_daemon={level},multiverse_transport={level}"
            ))?)
        }
    }
}
