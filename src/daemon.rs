//! Scheduling loop: event polling interleaved with idle redraws.
//!
//! Each iteration waits up to [`POLL_TIMEOUT`] for a pipe line, dispatches it
//! (running any foreground animation to completion), then redraws the idle
//! animation if [`IDLE_INTERVAL`] has passed or an event reset the timer.
//! The stop flag is only checked between iterations. Only device write
//! errors end the loop; a failing pipe is dropped and the strip keeps idling.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use multiverse_transport::{Frame, FrameSink};
use tracing::{debug, info, warn};

use crate::config;
use crate::dispatch::{Dispatcher, Outcome};
use crate::error::DaemonError;
use crate::event::Event;
use crate::launcher_state::DEFAULT_STATE_PATH;
use crate::pipe::{EventPipe, DEFAULT_FIFO_PATH};
use crate::player::{Pacer, Player, SleepPacer};

/// Longest wait for an event before considering an idle redraw.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Idle redraw period (30 Hz).
pub const IDLE_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 30);

/// File locations used by the daemon.
#[derive(Debug, Clone)]
pub struct DaemonPaths {
    pub fifo: PathBuf,
    pub config: PathBuf,
    pub state: PathBuf,
}

impl Default for DaemonPaths {
    fn default() -> Self {
        Self {
            fifo: PathBuf::from(DEFAULT_FIFO_PATH),
            config: config::default_config_path(),
            state: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }
}

/// One daemon instance: the player, the dispatcher and the (optional) pipe.
pub struct Scheduler<S: FrameSink, P: Pacer = SleepPacer> {
    player: Player<S, P>,
    dispatcher: Dispatcher,
    pipe: Option<EventPipe>,
    last_idle: Option<Instant>,
}

impl<S: FrameSink, P: Pacer> Scheduler<S, P> {
    pub fn new(player: Player<S, P>, dispatcher: Dispatcher, pipe: Option<EventPipe>) -> Self {
        Self {
            player,
            dispatcher,
            pipe,
            last_idle: None,
        }
    }

    pub fn player(&self) -> &Player<S, P> {
        &self.player
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Dispatch one event and restart the idle timer if it was handled.
    pub fn handle_event(&mut self, event: &Event) -> Result<Outcome, DaemonError> {
        let outcome = self.dispatcher.handle(event, &mut self.player)?;
        if outcome == Outcome::Handled {
            self.last_idle = None;
        }
        Ok(outcome)
    }

    /// One scheduling iteration.
    ///
    /// Pipe errors are logged and the pipe is dropped; the returned error is
    /// always a device write failure.
    pub fn tick(&mut self) -> Result<(), DaemonError> {
        let polled = self.pipe.as_mut().map(|pipe| pipe.next_line(POLL_TIMEOUT));
        let line = match polled {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                warn!("Event pipe failed ({e}); running without events");
                self.pipe = None;
                None
            }
            None => {
                std::thread::sleep(POLL_TIMEOUT);
                None
            }
        };

        if let Some(line) = line {
            debug!("Pipe line: {line}");
            self.handle_event(&Event::parse_line(&line))?;
        }

        if self.last_idle.map_or(true, |t| t.elapsed() >= IDLE_INTERVAL) {
            let frame = self.dispatcher.idle().next_frame();
            self.player.show(&frame)?;
            self.last_idle = Some(Instant::now());
        }
        Ok(())
    }

    /// Tick until `running` is cleared or an error occurs.
    pub fn run(&mut self, running: &AtomicBool) -> Result<(), DaemonError> {
        while running.load(Ordering::SeqCst) {
            self.tick()?;
        }
        Ok(())
    }

    /// Dark the strip and release the pipe. Returns the sink.
    pub fn shutdown(self) -> S {
        let Self {
            mut player, pipe, ..
        } = self;
        if let Err(e) = player.show(&Frame::off()) {
            warn!("Could not blank LEDs on exit: {e}");
        }
        drop(pipe);
        player.into_sink()
    }
}

/// Open the event pipe, logging instead of failing.
///
/// Without a pipe the daemon still draws idle frames; it just never
/// receives events.
pub fn open_pipe(paths: &DaemonPaths) -> Option<EventPipe> {
    match EventPipe::open(&paths.fifo) {
        Ok(pipe) => Some(pipe),
        Err(e) => {
            warn!(
                "FIFO {} unavailable ({e}); running without events",
                paths.fifo.display()
            );
            None
        }
    }
}

/// Run the daemon until `running` is cleared.
///
/// The strip is blanked and the pipe released on every exit path; the sink
/// is dropped (closed) before returning.
pub fn run<S: FrameSink>(
    sink: S,
    paths: &DaemonPaths,
    running: &AtomicBool,
) -> Result<(), DaemonError> {
    let dispatcher = Dispatcher::new(&paths.config, &paths.state);
    let pipe = open_pipe(paths);

    info!(
        "Daemon started; FIFO = {}, config = {}",
        paths.fifo.display(),
        paths.config.display()
    );

    let mut scheduler = Scheduler::new(Player::new(sink), dispatcher, pipe);
    let result = scheduler.run(running);
    if let Err(ref e) = result {
        warn!("Daemon loop stopped: {e}");
    }

    drop(scheduler.shutdown());
    info!("Daemon stopped");
    result
}
