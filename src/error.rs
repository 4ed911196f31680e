//! Daemon error types

use multiverse_transport::TransportError;
use thiserror::Error;

/// Errors that end the scheduling loop
#[derive(Error, Debug)]
pub enum DaemonError {
    /// Writing to the LED bridge failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
