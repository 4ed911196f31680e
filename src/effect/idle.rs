//! Idle animations: what the strip shows between events.
//!
//! An [`IdleGenerator`] is a pattern plus the instant it started. Frames are
//! a pure function of elapsed time, so the generator never runs out and
//! replacing it is just building a new one with a fresh origin.

use std::fmt;
use std::time::{Duration, Instant};

use multiverse_transport::{Color, Frame};

use super::{breath_frame, rainbow_frame, Breath};

const MENU_BREATH: Breath = Breath::new(0.8, 0.2, 0.8);
const ATTRACT_BREATH: Breath = Breath::new(0.6, 0.15, 0.6);
const ATTRACT_COLOR: Color = Color::new(0, 0, 0, 28);

/// Resting animation style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IdlePattern {
    /// Slow breathing in a system accent or the default menu color.
    Menu(Color),
    /// Dim breathing used for attract mode.
    AttractBreath,
    /// Hue rotation across the strip.
    Rainbow,
}

impl IdlePattern {
    /// Attract pattern for a configured mode name. Unknown names breathe.
    pub fn attract(mode: &str) -> Self {
        if mode.eq_ignore_ascii_case("rainbow") {
            Self::Rainbow
        } else {
            Self::AttractBreath
        }
    }

    /// Frame at `t` seconds since the pattern started.
    pub fn frame_at(&self, t: f64) -> Frame {
        match *self {
            Self::Menu(color) => breath_frame(t, color, MENU_BREATH),
            Self::AttractBreath => breath_frame(t, ATTRACT_COLOR, ATTRACT_BREATH),
            Self::Rainbow => rainbow_frame(t),
        }
    }
}

impl fmt::Display for IdlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Menu(c) => write!(f, "idle-menu(b={} g={} r={} br={})", c.b, c.g, c.r, c.br),
            Self::AttractBreath => write!(f, "idle-attract(breath)"),
            Self::Rainbow => write!(f, "idle-attract(rainbow)"),
        }
    }
}

/// The active idle animation and its time origin.
#[derive(Debug, Clone)]
pub struct IdleGenerator {
    pattern: IdlePattern,
    origin: Instant,
}

impl IdleGenerator {
    /// Start `pattern` now.
    pub fn new(pattern: IdlePattern) -> Self {
        Self {
            pattern,
            origin: Instant::now(),
        }
    }

    pub fn pattern(&self) -> IdlePattern {
        self.pattern
    }

    /// Frame at an explicit elapsed time.
    pub fn frame_at(&self, elapsed: Duration) -> Frame {
        self.pattern.frame_at(elapsed.as_secs_f64())
    }

    /// Frame for the current moment.
    pub fn next_frame(&self) -> Frame {
        self.frame_at(self.origin.elapsed())
    }
}
