//! Event dispatcher: the state machine behind the strip.
//!
//! The only persistent state is the current idle generator. Each event runs
//! its foreground animation to completion (blocking), then possibly swaps
//! the idle generator. Configuration is an owned snapshot replaced whole on
//! `reload-config`.

use std::path::PathBuf;

use multiverse_transport::{Color, Frame, FrameSink, TransportError};
use tracing::{debug, info};

use crate::config::SystemsConfig;
use crate::effect::idle::{IdleGenerator, IdlePattern};
use crate::effect::sequences;
use crate::event::{Event, EventKind};
use crate::launcher_state::{self, LauncherState};
use crate::player::{Pacer, Player};

/// Brightness for `solid` events that do not give one.
const SOLID_BRIGHTNESS: i64 = 24;

/// What dispatch did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The event was acted on; the idle redraw timer should restart.
    Handled,
    /// Unrecognised or empty event; nothing happened.
    Ignored,
}

pub struct Dispatcher {
    config: SystemsConfig,
    config_path: PathBuf,
    state_path: PathBuf,
    idle: IdleGenerator,
}

impl Dispatcher {
    /// Load configuration from `config_path` and start the default menu idle.
    pub fn new(config_path: impl Into<PathBuf>, state_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let config = SystemsConfig::load(&config_path);
        Self::with_config(config, config_path, state_path)
    }

    /// Start from an already loaded snapshot.
    pub fn with_config(
        config: SystemsConfig,
        config_path: impl Into<PathBuf>,
        state_path: impl Into<PathBuf>,
    ) -> Self {
        let idle = IdleGenerator::new(IdlePattern::Menu(config.default_menu_color()));
        Self {
            config,
            config_path: config_path.into(),
            state_path: state_path.into(),
            idle,
        }
    }

    pub fn idle(&self) -> &IdleGenerator {
        &self.idle
    }

    /// Re-read the configuration file and swap the snapshot.
    pub fn reload(&mut self) {
        self.config = SystemsConfig::load(&self.config_path);
    }

    fn set_idle(&mut self, pattern: IdlePattern) {
        debug!("Idle -> {pattern}");
        self.idle = IdleGenerator::new(pattern);
    }

    fn menu_idle(&mut self, system_key: &str) {
        let color = self.config.menu_color_for(system_key);
        self.set_idle(IdlePattern::Menu(color));
    }

    /// Lowercase system id from the event, else from the launcher state.
    fn system_key(&self, event: &Event) -> String {
        match event.system.as_deref().filter(|s| !s.is_empty()) {
            Some(system) => system.to_ascii_lowercase(),
            None => LauncherState::read(&self.state_path)
                .system_id()
                .unwrap_or_default()
                .to_ascii_lowercase(),
        }
    }

    /// ROM basename without extension, from the event or the launcher state.
    fn rom_key(&self, event: &Event) -> String {
        match event.rom.as_deref().filter(|s| !s.is_empty()) {
            Some(rom) => launcher_state::rom_key(rom),
            None => LauncherState::read(&self.state_path)
                .rom_path()
                .map(launcher_state::rom_key)
                .unwrap_or_default(),
        }
    }

    /// Act on one event. Blocks until any foreground animation finishes.
    ///
    /// A write error aborts the animation and is returned as is.
    pub fn handle<S, P>(
        &mut self,
        event: &Event,
        player: &mut Player<S, P>,
    ) -> Result<Outcome, TransportError>
    where
        S: FrameSink,
        P: Pacer,
    {
        let kind = event.kind();
        debug!("Event {kind}: {event:?}");

        match kind {
            EventKind::ReloadConfig => {
                self.reload();
                info!("Configuration reloaded");
            }
            EventKind::Menu => {
                let system = self.system_key(event);
                let color = self.config.menu_color_for(&system);
                player.play(&sequences::menu_pulse(color))?;
                self.set_idle(IdlePattern::Menu(color));
            }
            EventKind::GameStart => {
                let system = self.system_key(event);
                let rom = self.rom_key(event);
                let layout = self.config.start_layout(&system, &rom);
                let accent = self.config.accent(&system);
                debug!(
                    "Game start system={system:?} rom={rom:?} layout={}",
                    layout.is_some()
                );
                player.play(&sequences::game_start(layout, accent))?;
                self.menu_idle(&system);
            }
            EventKind::GameEnd => {
                let system = self.system_key(event);
                player.play(&sequences::game_end())?;
                self.menu_idle(&system);
            }
            EventKind::Shutdown => player.play(&sequences::shutdown())?,
            EventKind::Reboot => player.play(&sequences::reboot())?,
            EventKind::SettingsChanged => player.play(&sequences::settings_changed())?,
            EventKind::AttractOn => {
                let mode = self.config.default_attract_mode();
                self.set_idle(IdlePattern::attract(&mode));
            }
            EventKind::AttractOff => {
                let system = self.system_key(event);
                self.menu_idle(&system);
            }
            EventKind::Solid => {
                let color = Color::limited(
                    event.b.unwrap_or(0),
                    event.g.unwrap_or(0),
                    event.r.unwrap_or(0),
                    event.br.unwrap_or(SOLID_BRIGHTNESS),
                );
                player.show(&Frame::solid(color))?;
            }
            EventKind::Off => player.show(&Frame::off())?,
            EventKind::Unknown(name) => {
                debug!("Unknown event {name:?} ignored");
                return Ok(Outcome::Ignored);
            }
        }

        Ok(Outcome::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiverse_transport::BRIGHT_LIMIT;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder(Vec<Frame>);

    impl FrameSink for Recorder {
        fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
            self.0.push(*frame);
            Ok(())
        }
    }

    struct NoWait;

    impl Pacer for NoWait {
        fn wait(&mut self, _hold: Duration) {}
    }

    fn dispatcher(json: &str) -> Dispatcher {
        let cfg = SystemsConfig::from_json(json).unwrap();
        Dispatcher::with_config(cfg, "/nonexistent/systems.json", "/nonexistent/es_state.inf")
    }

    fn player() -> Player<Recorder, NoWait> {
        Player::with_pacer(Recorder::default(), NoWait)
    }

    #[test]
    fn test_unknown_event_sends_nothing() {
        let mut d = dispatcher("{}");
        let mut p = player();
        let before = d.idle().pattern();
        assert_eq!(d.handle(&Event::named("disco"), &mut p).unwrap(), Outcome::Ignored);
        assert_eq!(d.handle(&Event::default(), &mut p).unwrap(), Outcome::Ignored);
        assert!(p.sink().0.is_empty());
        assert_eq!(d.idle().pattern(), before);
    }

    #[test]
    fn test_off_sends_dark_frame() {
        let mut d = dispatcher("{}");
        let mut p = player();
        d.handle(&Event::named("off"), &mut p).unwrap();
        assert_eq!(p.sink().0, vec![Frame::off()]);
    }

    #[test]
    fn test_solid_defaults_and_cap() {
        let mut d = dispatcher("{}");
        let mut p = player();
        let mut e = Event::named("solid");
        e.r = Some(300);
        d.handle(&e, &mut p).unwrap();
        e.br = Some(255);
        d.handle(&e, &mut p).unwrap();
        assert_eq!(p.sink().0[0], Frame::solid(Color::new(0, 0, 255, 24)));
        assert_eq!(p.sink().0[1].0[0].br, BRIGHT_LIMIT);
    }

    #[test]
    fn test_attract_on_uses_configured_mode() {
        let mut d = dispatcher(r#"{"defaults": {"attract": "RAINBOW"}}"#);
        let mut p = player();
        d.handle(&Event::named("attract-on"), &mut p).unwrap();
        assert_eq!(d.idle().pattern(), IdlePattern::Rainbow);
        assert!(p.sink().0.is_empty());
    }

    #[test]
    fn test_attract_off_returns_to_accent() {
        let mut d = dispatcher(r#"{"snes": {"accent": {"r": 9, "g": 8, "b": 7, "br": 6}}}"#);
        let mut p = player();
        d.handle(&Event::named("attract-on"), &mut p).unwrap();
        let mut off = Event::named("attract-off");
        off.system = Some("SNES".to_string());
        d.handle(&off, &mut p).unwrap();
        assert_eq!(d.idle().pattern(), IdlePattern::Menu(Color::new(7, 8, 9, 6)));
    }

    #[test]
    fn test_menu_pulses_then_idles() {
        let mut d = dispatcher("{}");
        let mut p = player();
        d.handle(&Event::named("menu"), &mut p).unwrap();
        assert_eq!(p.sink().0.len(), 120);
        assert_eq!(
            d.idle().pattern(),
            IdlePattern::Menu(crate::config::DEFAULT_MENU_COLOR)
        );
    }

    #[test]
    fn test_game_end_then_menu_idle() {
        let mut d = dispatcher("{}");
        let mut p = player();
        d.handle(&Event::named("game-end"), &mut p).unwrap();
        assert!(!p.sink().0.is_empty());
        assert!(matches!(d.idle().pattern(), IdlePattern::Menu(_)));
    }

    #[test]
    fn test_shutdown_keeps_idle() {
        let mut d = dispatcher(r#"{"defaults": {"attract": "rainbow"}}"#);
        let mut p = player();
        d.handle(&Event::named("attract-on"), &mut p).unwrap();
        for name in ["shutdown", "reboot", "settings-changed", "controls-changed"] {
            d.handle(&Event::named(name), &mut p).unwrap();
        }
        assert_eq!(d.idle().pattern(), IdlePattern::Rainbow);
    }
}
