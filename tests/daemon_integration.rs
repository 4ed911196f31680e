//! End-to-end tests for the daemon pipeline.
//!
//! These drive a real FIFO under the temp directory through the scheduler,
//! with an in-memory sink and no real-time pacing, exercising pipe framing,
//! event decoding, dispatch, config resolution and idle redraws together.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use multiverse_transport::{Color, Frame, FrameSink, TransportError, BRIGHT_LIMIT};
use pm_daemon::config::DEFAULT_MENU_COLOR;
use pm_daemon::daemon::open_pipe;
use pm_daemon::pipe::post_line;
use pm_daemon::{DaemonPaths, Dispatcher, Event, IdlePattern, Pacer, Player, Scheduler};

#[derive(Default)]
struct Recorder(Vec<Frame>);

impl FrameSink for Recorder {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        self.0.push(*frame);
        Ok(())
    }
}

#[derive(Default)]
struct NoWait;

impl Pacer for NoWait {
    fn wait(&mut self, _hold: Duration) {}
}

struct Fixture {
    dir: PathBuf,
    paths: DaemonPaths,
}

impl Fixture {
    fn new(tag: &str, config: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("pm-daemon-it-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let paths = DaemonPaths {
            fifo: dir.join("pm.fifo"),
            config: dir.join("systems.json"),
            state: dir.join("es_state.inf"),
        };
        fs::write(&paths.config, config).unwrap();
        Self { dir, paths }
    }

    fn scheduler(&self) -> Scheduler<Recorder, NoWait> {
        let dispatcher = Dispatcher::new(&self.paths.config, &self.paths.state);
        let pipe = open_pipe(&self.paths);
        assert!(pipe.is_some(), "FIFO should open");
        Scheduler::new(Player::with_pacer(Recorder::default(), NoWait), dispatcher, pipe)
    }

    fn post(&self, line: &str) {
        post_line(&self.paths.fifo, line).unwrap();
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn frames<P: Pacer>(s: &Scheduler<Recorder, P>) -> &[Frame] {
    &s.player().sink().0
}

const SNES_CONFIG: &str = r##"{
    "snes": {
        "accent": { "r": 80, "g": 0, "b": 160, "br": 40 },
        "start_layout": ["#00FF00"],
        "rom_overrides": { "Foo": { "start_layout": ["#FF0000:90", "#0000FF:255"] } }
    }
}"##;

#[test]
fn game_start_plays_rom_layout_without_wipe() {
    let fx = Fixture::new("game-start", SNES_CONFIG);
    let mut s = fx.scheduler();

    fx.post(r#"{"event":"game-start","system":"snes","rom":"/roms/snes/Foo.sfx"}"#);
    s.tick().unwrap();

    let expected = Frame::from_slice(&[
        Color::new(0, 0, 0xFF, 90),
        Color::new(0xFF, 0, 0, BRIGHT_LIMIT),
    ]);
    let sent = frames(&s);
    // Layout frame, then the immediate idle redraw.
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], expected);
    assert_eq!(
        s.dispatcher().idle().pattern(),
        IdlePattern::Menu(Color::new(160, 0, 80, 40))
    );
    assert!(sent[1].0.iter().all(|c| (c.b, c.g, c.r) == (160, 0, 80)));
}

#[test]
fn game_start_without_accent_idles_on_default() {
    let fx = Fixture::new("default-accent", r##"{"nes": {"start_layout": ["#010203"]}}"##);
    let mut s = fx.scheduler();

    fx.post(r#"{"event":"game-start","system":"nes","rom":"/roms/nes/Bar.nes"}"#);
    s.tick().unwrap();

    assert_eq!(frames(&s)[0].0[0], Color::new(3, 2, 1, 64));
    assert_eq!(
        s.dispatcher().idle().pattern(),
        IdlePattern::Menu(DEFAULT_MENU_COLOR)
    );
}

#[test]
fn off_is_next_frame_whatever_was_playing() {
    let fx = Fixture::new("off", r#"{"defaults": {"attract": "rainbow"}}"#);
    let mut s = fx.scheduler();

    fx.post(r#"{"event":"attract-on"}"#);
    s.tick().unwrap();
    let before = frames(&s).len();
    assert!(!frames(&s)[before - 1].is_off());

    fx.post(r#"{"event":"off"}"#);
    s.tick().unwrap();
    assert_eq!(frames(&s)[before], Frame::off());
}

#[test]
fn unknown_and_garbled_lines_only_idle() {
    let fx = Fixture::new("garbled", "{}");
    let mut s = fx.scheduler();

    s.tick().unwrap();
    let pattern = s.dispatcher().idle().pattern();
    let before = frames(&s).len();
    assert_eq!(before, 1);

    fx.post(r#"{"event":"disco-mode"}"#);
    fx.post("{not json");
    s.tick().unwrap();
    s.tick().unwrap();

    // Only regular idle ticks may have drawn anything: every frame since is
    // a menu breath in the default color.
    for frame in &frames(&s)[before..] {
        let c = frame.0[0];
        assert_eq!((c.b, c.g, c.r), (DEFAULT_MENU_COLOR.b, DEFAULT_MENU_COLOR.g, DEFAULT_MENU_COLOR.r));
    }
    assert_eq!(s.dispatcher().idle().pattern(), pattern);
}

#[test]
fn idle_not_redrawn_within_interval() {
    let fx = Fixture::new("interval", "{}");
    let mut s = fx.scheduler();

    // Both lines are buffered, so neither tick waits on the poll.
    fx.post("{\"event\":\"disco\"}\n{\"event\":\"strobe\"}");
    s.tick().unwrap();
    s.tick().unwrap();

    assert_eq!(frames(&s).len(), 1);
}

#[test]
fn lines_arriving_together_dispatch_in_order() {
    let fx = Fixture::new("batch", "{}");
    let mut s = fx.scheduler();

    fx.post("{\"event\":\"solid\",\"r\":200}\n{\"event\":\"off\"}");
    s.tick().unwrap();
    s.tick().unwrap();

    let sent = frames(&s);
    let solid = Frame::solid(Color::new(0, 0, 200, 24));
    let solid_at = sent.iter().position(|f| *f == solid).unwrap();
    let off_at = sent.iter().position(|f| f.is_off()).unwrap();
    assert!(solid_at < off_at);
}

#[test]
fn reload_picks_up_edited_config() {
    let fx = Fixture::new(
        "reload",
        r#"{"snes": {"accent": {"r": 10, "g": 0, "b": 0, "br": 100}}}"#,
    );
    let mut s = fx.scheduler();

    fs::write(
        &fx.paths.config,
        r#"{"snes": {"accent": {"r": 0, "g": 99, "b": 0, "br": 100}}}"#,
    )
    .unwrap();
    fx.post(r#"{"event":"reload-config"}"#);
    s.tick().unwrap();

    let before = frames(&s).len();
    fx.post(r#"{"event":"menu","system":"snes"}"#);
    s.tick().unwrap();

    let pulse = &frames(&s)[before];
    assert_eq!((pulse.0[0].g, pulse.0[0].r), (99, 0));
    assert_eq!(
        s.dispatcher().idle().pattern(),
        IdlePattern::Menu(Color::new(0, 99, 0, 100))
    );
}

#[test]
fn missing_system_falls_back_to_launcher_state() {
    let fx = Fixture::new("state", SNES_CONFIG);
    fs::write(
        &fx.paths.state,
        "Action=rungame\nSystemId=SNES\nRomPath=/roms/snes/Foo.sfc\n",
    )
    .unwrap();
    let mut s = fx.scheduler();

    fx.post(r#"{"event":"game-start"}"#);
    s.tick().unwrap();

    assert_eq!(frames(&s)[0].0[0], Color::new(0, 0, 0xFF, 90));
}

#[test]
fn shutdown_blanks_strip_and_keeps_fifo() {
    let fx = Fixture::new("shutdown", "{}");
    let mut s = fx.scheduler();
    s.tick().unwrap();

    let sink = s.shutdown();
    assert_eq!(sink.0.last(), Some(&Frame::off()));
    assert!(is_fifo(&fx.paths.fifo));
}

#[test]
fn regular_file_in_fifo_path_is_replaced() {
    let fx = Fixture::new("replace", "{}");
    fs::write(&fx.paths.fifo, "stale").unwrap();
    let _s = fx.scheduler();
    assert!(is_fifo(&fx.paths.fifo));
}

#[test]
fn event_serializes_for_send() {
    let event = Event {
        system: Some("snes".to_string()),
        ..Event::named("menu")
    };
    let line = serde_json::to_string(&event).unwrap();
    assert_eq!(line, r#"{"event":"menu","system":"snes"}"#);
    assert_eq!(Event::parse_line(&line), event);
}

fn is_fifo(path: &Path) -> bool {
    use std::os::unix::fs::FileTypeExt;
    fs::metadata(path)
        .map(|m| m.file_type().is_fifo())
        .unwrap_or(false)
}
