//! Writes frames and sequences to the device, owning all pacing.

use std::time::Duration;

use multiverse_transport::{Frame, FrameSink, TransportError};

use crate::effect::Step;

/// Waits between frames of a sequence.
pub trait Pacer {
    fn wait(&mut self, hold: Duration);
}

/// Real-time pacing with `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn wait(&mut self, hold: Duration) {
        if !hold.is_zero() {
            std::thread::sleep(hold);
        }
    }
}

/// Exclusive owner of the sink. One frame in flight at a time.
pub struct Player<S, P = SleepPacer> {
    sink: S,
    pacer: P,
}

impl<S: FrameSink> Player<S, SleepPacer> {
    pub fn new(sink: S) -> Self {
        Self::with_pacer(sink, SleepPacer)
    }
}

impl<S: FrameSink, P: Pacer> Player<S, P> {
    pub fn with_pacer(sink: S, pacer: P) -> Self {
        Self { sink, pacer }
    }

    /// Send a single frame without waiting.
    pub fn show(&mut self, frame: &Frame) -> Result<(), TransportError> {
        self.sink.send(frame)
    }

    /// Play a sequence to completion. The first write error aborts it.
    pub fn play(&mut self, seq: &[Step]) -> Result<(), TransportError> {
        for step in seq {
            self.sink.send(&step.frame)?;
            self.pacer.wait(step.hold);
        }
        Ok(())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
