//! Wire constants shared with the bridge firmware.

/// Number of LEDs on the strip. Fixed; the firmware does not report it.
pub const NUM_LEDS: usize = 7;

/// Logical-to-physical slot permutation applied before encoding.
/// Slot `i` on the wire carries logical LED `ORDER[i]`.
pub const ORDER: [usize; NUM_LEDS] = [0, 1, 2, 3, 4, 5, 6];

/// Ceiling for brightness values sourced from configuration or defaults.
pub const BRIGHT_LIMIT: u8 = 170;

/// ASCII literal the firmware scans for before reading LED data.
pub const HEADER: &[u8] = b"multiverse:data";

/// Bytes per LED on the wire (blue, green, red, brightness).
pub const BYTES_PER_LED: usize = 4;

/// Total encoded frame size.
pub const FRAME_LEN: usize = HEADER.len() + BYTES_PER_LED * NUM_LEDS;

/// Serial line settings.
pub mod serial {
    use std::time::Duration;

    pub const BAUD_RATE: u32 = 115_200;
    pub const WRITE_TIMEOUT: Duration = Duration::from_millis(50);
    /// Timeout used when probing a candidate during discovery
    pub const PROBE_TIMEOUT: Duration = Duration::from_millis(100);
}
