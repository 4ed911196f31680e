//! Animation library.
//!
//! Two kinds of animation live here:
//! - time functions (`breath_frame`, `rainbow_frame`) used by idle patterns,
//!   pure in elapsed seconds and valid for any `t`;
//! - finite [`Sequence`]s (`wipe`, `fade`, `pulse`, `flash`) that list their
//!   frames together with how long each is held.
//!
//! Nothing in this module sleeps or writes. [`crate::player::Player`] does the
//! pacing when a sequence is played on the device.

pub mod idle;
pub mod sequences;

use std::time::Duration;

use multiverse_transport::{clamp_byte, Color, Frame, NUM_LEDS};

use crate::color::hsv_to_rgb;

/// Interval between fade samples.
pub const FADE_STEP: Duration = Duration::from_millis(20);

/// One frame of a finite animation and how long it stays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub frame: Frame,
    pub hold: Duration,
}

impl Step {
    pub fn new(frame: Frame, hold: Duration) -> Self {
        Self { frame, hold }
    }
}

/// Ordered frames with per-frame delays.
pub type Sequence = Vec<Step>;

/// Total wall-clock length of a sequence.
pub fn duration(seq: &[Step]) -> Duration {
    seq.iter().map(|s| s.hold).sum()
}

// ── Breath ───────────────────────────────────────────────────────────

/// Sine brightness envelope: factor moves between `min` and `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breath {
    pub speed: f64,
    pub min: f64,
    pub max: f64,
}

impl Breath {
    pub const fn new(speed: f64, min: f64, max: f64) -> Self {
        Self { speed, min, max }
    }

    /// Brightness factor at `t` seconds.
    pub fn factor(&self, t: f64) -> f64 {
        let wave = ((t * self.speed).sin() + 1.0) / 2.0;
        self.min + (self.max - self.min) * wave
    }
}

/// Whole strip in `color`, its brightness scaled by the envelope at `t`.
pub fn breath_frame(t: f64, color: Color, breath: Breath) -> Frame {
    let br = clamp_byte((color.br as f64 * breath.factor(t)) as i64);
    Frame::solid(color.with_brightness(br))
}

// ── Rainbow ──────────────────────────────────────────────────────────

/// Hue cycles per second.
const RAINBOW_RATE: f64 = 0.05;
/// HSV value of rainbow LEDs (0-255).
const RAINBOW_VALUE: f32 = 24.0;
const RAINBOW_BRIGHTNESS: u8 = 20;

/// Hue (0..1) of LED `led` at `t` seconds; neighbours are spread evenly.
pub fn rainbow_hue(t: f64, led: usize) -> f64 {
    (t * RAINBOW_RATE + led as f64 / NUM_LEDS as f64).rem_euclid(1.0)
}

pub fn rainbow_frame(t: f64) -> Frame {
    let mut leds = [Color::OFF; NUM_LEDS];
    for (i, led) in leds.iter_mut().enumerate() {
        let hue = rainbow_hue(t, i) as f32 * 360.0;
        let (r, g, b) = hsv_to_rgb(hue, 1.0, RAINBOW_VALUE);
        *led = Color::new(b, g, r, RAINBOW_BRIGHTNESS);
    }
    Frame(leds)
}

// ── Sequences ────────────────────────────────────────────────────────

/// Light LEDs `0..=k` for `k = 0..NUM_LEDS`, each step held for `step`.
pub fn wipe(color: Color, step: Duration) -> Sequence {
    (0..NUM_LEDS)
        .map(|k| {
            let mut leds = [Color::OFF; NUM_LEDS];
            leds[..=k].fill(color);
            Step::new(Frame(leds), step)
        })
        .collect()
}

/// Linear brightness ramp of a dark strip from `from` to `to` over `total`,
/// sampled every [`FADE_STEP`]. Both ends are included.
///
/// Only the brightness byte moves; all color channels stay zero.
pub fn fade(from: u8, to: u8, total: Duration) -> Sequence {
    let steps = (total.as_millis() / FADE_STEP.as_millis()).max(1) as u32;
    (0..=steps)
        .map(|s| {
            let t = s as f64 / steps as f64;
            let level = from as f64 + (to as f64 - from as f64) * t;
            Step::new(Frame::solid(Color::limited(0, 0, 0, level as i64)), FADE_STEP)
        })
        .collect()
}

/// Breathing `color` sampled at `fps` for `length`.
pub fn pulse(color: Color, breath: Breath, length: Duration, fps: u32) -> Sequence {
    let fps = fps.max(1);
    let frame_time = Duration::from_secs_f64(1.0 / fps as f64);
    let count = (length.as_secs_f64() * fps as f64).round() as usize;
    (0..count)
        .map(|i| {
            let t = i as f64 / fps as f64;
            Step::new(breath_frame(t, color, breath), frame_time)
        })
        .collect()
}

/// Alternate `on` and `off` frames `times` times.
pub fn flash(on: Frame, on_hold: Duration, off: Frame, off_hold: Duration, times: usize) -> Sequence {
    (0..times)
        .flat_map(|_| [Step::new(on, on_hold), Step::new(off, off_hold)])
        .collect()
}
