//! Serial transport for the Pixel Multiverse LED bridge.
//!
//! The bridge is write-only: frames go out as
//! `b"multiverse:data" ++ (b, g, r, br) * NUM_LEDS` and nothing comes back.

pub mod discovery;
pub mod error;
pub mod frame;
pub mod protocol;
pub mod sink;

pub use discovery::Discovery;
pub use error::TransportError;
pub use frame::{clamp_byte, Color, Frame};
pub use protocol::{BRIGHT_LIMIT, HEADER, NUM_LEDS, ORDER};
pub use sink::{FrameSink, SerialSink};
