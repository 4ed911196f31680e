// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pm-daemon")]
#[command(author, version, about = "Event-driven LED daemon for the Pixel Multiverse bridge")]
#[command(propagate_version = true)]
pub struct Cli {
    /// systems.json location (default: $PM_CONFIG or the Recalbox share path)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Event pipe location
    #[arg(long, global = true, value_name = "PATH")]
    pub fifo: Option<PathBuf>,

    /// Launcher state file consulted when events omit system/rom
    #[arg(long = "state-file", global = true, value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Serial device (overrides $PM_PORT and discovery)
    #[arg(long, global = true, value_name = "DEVICE")]
    pub port: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the daemon (default)
    Run,

    /// Post an event to a running daemon
    Send {
        /// Event name (menu, game-start, off, ...)
        event: String,
        /// System id
        #[arg(long)]
        system: Option<String>,
        /// ROM path
        #[arg(long)]
        rom: Option<String>,
    },

    /// List candidate serial devices in preference order
    #[command(visible_alias = "list")]
    Ports,

    /// Load systems.json and print what each system resolves to
    #[command(name = "check-config")]
    CheckConfig,
}
