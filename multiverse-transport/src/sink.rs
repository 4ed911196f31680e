//! Write-only frame sinks.
//!
//! The link has no acknowledgement: a frame is encoded, written and flushed.
//! Write failures are returned to the caller and never retried here.

use std::io::Write;
use std::path::Path;

use serialport::SerialPort;
use tracing::debug;

use crate::error::TransportError;
use crate::frame::Frame;
use crate::protocol::serial;

/// Anything that accepts complete frames.
pub trait FrameSink {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError>;
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        (**self).send(frame)
    }
}

/// Frame sink over a byte writer; the serial port in production.
pub struct SerialSink<W: Write = Box<dyn SerialPort>> {
    port: W,
    name: String,
}

impl SerialSink {
    /// Open a serial device at the bridge's line settings.
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let name = path.display().to_string();
        let port = serialport::new(name.as_str(), serial::BAUD_RATE)
            .timeout(serial::WRITE_TIMEOUT)
            .open()?;
        debug!("Opened serial port {name}");
        Ok(Self { port, name })
    }
}

impl<W: Write> SerialSink<W> {
    /// Wrap an arbitrary writer.
    pub fn from_writer(port: W, name: impl Into<String>) -> Self {
        Self {
            port,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_inner(self) -> W {
        self.port
    }
}

impl<W: Write> FrameSink for SerialSink<W> {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        self.port.write_all(&frame.encode())?;
        self.port.flush()?;
        Ok(())
    }
}
