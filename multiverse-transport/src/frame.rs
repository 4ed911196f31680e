//! Color tuples, frames and the wire codec.
//!
//! A frame is always exactly [`NUM_LEDS`] tuples. Encoding walks the
//! [`ORDER`] permutation and writes `HEADER ++ (b, g, r, br) * NUM_LEDS`.

use crate::protocol::{BRIGHT_LIMIT, BYTES_PER_LED, FRAME_LEN, HEADER, NUM_LEDS, ORDER};

/// One LED: blue, green, red and brightness, each a byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub br: u8,
}

impl Color {
    pub const OFF: Self = Self {
        b: 0,
        g: 0,
        r: 0,
        br: 0,
    };

    pub const fn new(b: u8, g: u8, r: u8, br: u8) -> Self {
        Self { b, g, r, br }
    }

    /// Build from arbitrary integers, clamping every channel to a byte.
    pub fn from_channels(b: i64, g: i64, r: i64, br: i64) -> Self {
        Self {
            b: clamp_byte(b),
            g: clamp_byte(g),
            r: clamp_byte(r),
            br: clamp_byte(br),
        }
    }

    /// Like [`Color::from_channels`] but brightness is also held under
    /// [`BRIGHT_LIMIT`]. Use for anything sourced from configuration or events.
    pub fn limited(b: i64, g: i64, r: i64, br: i64) -> Self {
        Self::from_channels(b, g, r, br.min(BRIGHT_LIMIT as i64))
    }

    /// Same color with a different brightness.
    pub fn with_brightness(self, br: u8) -> Self {
        Self { br, ..self }
    }

    /// Wire representation in (b, g, r, br) order.
    pub fn to_bytes(self) -> [u8; BYTES_PER_LED] {
        [self.b, self.g, self.r, self.br]
    }
}

/// Clamp an integer into `0..=255`.
pub fn clamp_byte(v: i64) -> u8 {
    v.clamp(0, 255) as u8
}

/// A complete set of LED values, in logical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame(pub [Color; NUM_LEDS]);

impl Default for Frame {
    fn default() -> Self {
        Self::off()
    }
}

impl Frame {
    /// All LEDs dark.
    pub const fn off() -> Self {
        Self([Color::OFF; NUM_LEDS])
    }

    /// Every LED the same color.
    pub const fn solid(color: Color) -> Self {
        Self([color; NUM_LEDS])
    }

    /// Build from a slice of any length: extra entries are dropped,
    /// missing ones are dark.
    pub fn from_slice(colors: &[Color]) -> Self {
        let mut leds = [Color::OFF; NUM_LEDS];
        for (dst, src) in leds.iter_mut().zip(colors) {
            *dst = *src;
        }
        Self(leds)
    }

    pub fn is_off(&self) -> bool {
        self.0.iter().all(|c| *c == Color::OFF)
    }

    /// Encode with the default [`ORDER`] permutation.
    pub fn encode(&self) -> Vec<u8> {
        encode_with_order(&self.0, &ORDER)
    }
}

/// Encode `colors` through an explicit slot permutation.
///
/// Slots whose source index is past the end of `colors` are sent dark, so the
/// output is always `HEADER.len() + 4 * NUM_LEDS` bytes.
pub fn encode_with_order(colors: &[Color], order: &[usize; NUM_LEDS]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_LEN);
    out.extend_from_slice(HEADER);
    for &src in order {
        let color = colors.get(src).copied().unwrap_or(Color::OFF);
        out.extend_from_slice(&color.to_bytes());
    }
    out
}
