//! Foreground animations played in response to launcher events.

use std::time::Duration;

use multiverse_transport::{Color, Frame, BRIGHT_LIMIT};

use super::{fade, flash, pulse, wipe, Breath, Sequence, Step};

/// Frame rate for time-sampled foreground animations.
pub const FOREGROUND_FPS: u32 = 60;

const MENU_PULSE_LENGTH: Duration = Duration::from_secs(2);
const MENU_PULSE: Breath = Breath::new(1.0, 0.3, 0.9);

const START_LAYOUT_HOLD: Duration = Duration::from_secs(1);
const START_WIPE_STEP: Duration = Duration::from_millis(40);
const START_FALLBACK: Color = Color::new(0, 64, 0, BRIGHT_LIMIT);
const START_DIM: Color = Color::new(0, 0, 0, 18);
const START_DIM_HOLD: Duration = Duration::from_millis(250);

const END_WIPE: Color = Color::new(0, 0, 64, BRIGHT_LIMIT);
const END_WIPE_STEP: Duration = Duration::from_millis(40);

const SHUTDOWN_FLASH: Color = Color::new(0, 0, 0, BRIGHT_LIMIT);
const SHUTDOWN_DIM: Color = Color::new(0, 0, 0, 8);

const REBOOT_GREEN: Color = Color::new(0, 64, 0, BRIGHT_LIMIT);
const REBOOT_RED: Color = Color::new(0, 0, 64, BRIGHT_LIMIT);
const REBOOT_WIPE_STEP: Duration = Duration::from_millis(35);

const SETTINGS_FLASH: Color = Color::new(32, 32, 0, BRIGHT_LIMIT);

/// Two-second breathing pulse in `color`.
pub fn menu_pulse(color: Color) -> Sequence {
    pulse(color, MENU_PULSE, MENU_PULSE_LENGTH, FOREGROUND_FPS)
}

/// Show the start layout for a second, or wipe the accent and settle dim.
pub fn game_start(layout: Option<Frame>, accent: Option<Color>) -> Sequence {
    if let Some(frame) = layout {
        return vec![Step::new(frame, START_LAYOUT_HOLD)];
    }

    let mut seq = wipe(accent.unwrap_or(START_FALLBACK), START_WIPE_STEP);
    seq.push(Step::new(Frame::solid(START_DIM), START_DIM_HOLD));
    seq
}

/// Red wipe, then fade down.
pub fn game_end() -> Sequence {
    let mut seq = wipe(END_WIPE, END_WIPE_STEP);
    seq.extend(fade(28, 10, Duration::from_millis(600)));
    seq
}

/// Triple flash, then fade to off.
pub fn shutdown() -> Sequence {
    let mut seq = flash(
        Frame::solid(SHUTDOWN_FLASH),
        Duration::from_millis(80),
        Frame::solid(SHUTDOWN_DIM),
        Duration::from_millis(100),
        3,
    );
    seq.extend(fade(24, 0, Duration::from_millis(900)));
    seq
}

/// Green wipe, red wipe, fade to off.
pub fn reboot() -> Sequence {
    let mut seq = wipe(REBOOT_GREEN, REBOOT_WIPE_STEP);
    seq.extend(wipe(REBOOT_RED, REBOOT_WIPE_STEP));
    seq.extend(fade(28, 0, Duration::from_millis(500)));
    seq
}

/// Triple flash acknowledging a settings or controls change.
pub fn settings_changed() -> Sequence {
    flash(
        Frame::solid(SETTINGS_FLASH),
        Duration::from_millis(120),
        Frame::off(),
        Duration::from_millis(80),
        3,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::duration;
    use multiverse_transport::NUM_LEDS;

    #[test]
    fn test_game_start_layout_is_single_frame() {
        let layout = Frame::solid(Color::new(1, 2, 3, 4));
        let seq = game_start(Some(layout), Some(Color::new(9, 9, 9, 9)));
        assert_eq!(seq, vec![Step::new(layout, Duration::from_secs(1))]);
    }

    #[test]
    fn test_game_start_fallback_uses_accent() {
        let accent = Color::new(5, 6, 7, 8);
        let seq = game_start(None, Some(accent));
        assert_eq!(seq.len(), NUM_LEDS + 1);
        assert_eq!(seq[NUM_LEDS - 1].frame, Frame::solid(accent));
        assert_eq!(seq[NUM_LEDS].frame, Frame::solid(START_DIM));
    }

    #[test]
    fn test_game_start_default_wipe() {
        let seq = game_start(None, None);
        assert_eq!(seq[0].frame.0[0], START_FALLBACK);
    }

    #[test]
    fn test_game_end_is_red() {
        let seq = game_end();
        let first = seq[0].frame.0[0];
        assert!(first.r > 0 && first.g == 0 && first.b == 0);
        assert_eq!(seq.last().unwrap().frame, Frame::solid(Color::new(0, 0, 0, 10)));
        for step in &seq[NUM_LEDS..] {
            assert!(step.frame.0.iter().all(|c| (c.b, c.g, c.r) == (0, 0, 0)));
        }
    }

    #[test]
    fn test_shutdown_ends_dark() {
        let seq = shutdown();
        assert_eq!(seq.last().unwrap().frame.0[0].br, 0);
        assert_eq!(seq.len(), 6 + 46);
    }

    #[test]
    fn test_reboot_order() {
        let seq = reboot();
        assert_eq!(seq[NUM_LEDS - 1].frame, Frame::solid(REBOOT_GREEN));
        assert_eq!(seq[2 * NUM_LEDS - 1].frame, Frame::solid(REBOOT_RED));
        assert_eq!(seq[2 * NUM_LEDS].frame, Frame::solid(Color::new(0, 0, 0, 28)));
        assert_eq!(seq.last().unwrap().frame, Frame::off());
    }

    #[test]
    fn test_settings_changed_timing() {
        let seq = settings_changed();
        assert_eq!(seq.len(), 6);
        assert_eq!(duration(&seq), Duration::from_millis(600));
    }

    #[test]
    fn test_menu_pulse_length() {
        let seq = menu_pulse(Color::new(0, 32, 64, 28));
        assert_eq!(seq.len(), 120);
    }
}
