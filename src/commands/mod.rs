//! Command handlers for the CLI application.
//!
//! - `run` (here): discover the bridge and run the daemon
//! - `utility`: client-side helpers (send, ports, check-config)

pub mod utility;

use anyhow::Context;
use multiverse_transport::{Discovery, SerialSink};
use pm_daemon::DaemonPaths;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

use crate::cli::Cli;

/// Resolve file locations from CLI flags, falling back to defaults.
pub fn daemon_paths(cli: &Cli) -> DaemonPaths {
    let defaults = DaemonPaths::default();
    DaemonPaths {
        fifo: cli.fifo.clone().unwrap_or(defaults.fifo),
        config: cli.config.clone().unwrap_or(defaults.config),
        state: cli.state_file.clone().unwrap_or(defaults.state),
    }
}

/// Set up a SIGINT/SIGTERM handler that sets the given flag to false when triggered.
/// Returns the Arc<AtomicBool> for use in the main loop.
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    running
}

/// Find the LED bridge and run the daemon until interrupted.
pub fn run(paths: &DaemonPaths, port: Option<PathBuf>) -> anyhow::Result<()> {
    let device = match Discovery::new().with_override(port).find() {
        Ok(device) => device,
        Err(e) => {
            error!("No serial port found (is the bridge connected and its firmware running?)");
            return Err(e.into());
        }
    };

    let sink = SerialSink::open(&device)
        .with_context(|| format!("open serial port {}", device.display()))?;
    info!("Serial port {}", sink.name());

    let running = setup_interrupt_handler();
    pm_daemon::daemon::run(sink, paths, &running)?;
    Ok(())
}
