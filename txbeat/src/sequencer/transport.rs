use std::time::Duration;

use crate::audio_api::{DrumOutput, LOOKAHEAD};
use crate::pipeline::pattern::Pattern;
use crate::shared::{StepKind, STEPS};

use super::scheduler::{Scheduler, TimerHandle};
use super::timing::Tempo;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
}

/// What one tick did, mostly for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub step: usize,
    pub kind: StepKind,
    pub next_delay: Duration,
}

/// Walks the live pattern one sixteenth at a time.
///
/// The transport owns the step index, the playing flag and the one pending
/// timer. The pattern is borrowed fresh on every call so edits show up on
/// the very next tick.
pub struct Transport<S: Scheduler> {
    scheduler: S,
    state: PlayState,
    step: usize,   // next step to play
    cursor: usize, // last step played, what the grid highlights
    pending: Option<TimerHandle>,
    tempo: Tempo,
}

impl<S: Scheduler> Transport<S> {
    pub fn new(scheduler: S, tempo: Tempo) -> Self {
        Self {
            scheduler,
            state: PlayState::Stopped,
            step: 0,
            cursor: 0,
            pending: None,
            tempo,
        }
    }

    pub fn start<O: DrumOutput + ?Sized>(&mut self, pattern: &Pattern, out: &mut O) -> Option<Tick> {
        if self.state == PlayState::Playing {
            return None;
        }
        out.resume();
        self.state = PlayState::Playing;
        log::info!("transport start at step {} ({} bpm, swing {}%)", self.step, self.tempo.bpm(), self.tempo.swing());
        Some(self.tick(pattern, out))
    }

    pub fn stop(&mut self) {
        self.cancel_pending();
        if self.state == PlayState::Playing {
            log::info!("transport stop");
        }
        self.state = PlayState::Stopped;
        self.step = 0;
        self.cursor = 0;
    }

    /// Back to the top of the pattern without touching timing. Used when a
    /// whole new pattern is loaded.
    pub fn rewind(&mut self) {
        self.step = 0;
        self.cursor = 0;
    }

    /// Throw away the pending tick and play the next step right now, keeping
    /// our place in the bar. Used when tempo or swing change mid-play.
    pub fn restart<O: DrumOutput + ?Sized>(&mut self, pattern: &Pattern, out: &mut O) -> Option<Tick> {
        if self.state != PlayState::Playing {
            return None;
        }
        self.cancel_pending();
        Some(self.tick(pattern, out))
    }

    /// Called by whoever drives the scheduler once `handle` is due. Handles
    /// that aren't the current pending one are stale and get ignored.
    pub fn on_timer<O: DrumOutput + ?Sized>(
        &mut self,
        handle: TimerHandle,
        pattern: &Pattern,
        out: &mut O,
    ) -> Option<Tick> {
        if self.state != PlayState::Playing || self.pending != Some(handle) {
            log::debug!("dropping stale timer {handle:?}");
            return None;
        }
        self.pending = None;
        Some(self.tick(pattern, out))
    }

    /// Apply new timing right away. A tempo that clamps back to the current
    /// one is not a change and leaves the pending tick alone.
    pub fn set_tempo<O: DrumOutput + ?Sized>(&mut self, tempo: Tempo, pattern: &Pattern, out: &mut O) -> Option<Tick> {
        if tempo == self.tempo {
            return None;
        }
        self.tempo = tempo;
        self.restart(pattern, out)
    }

    pub fn set_bpm<O: DrumOutput + ?Sized>(&mut self, bpm: u32, pattern: &Pattern, out: &mut O) -> Option<Tick> {
        self.set_tempo(self.tempo.with_bpm(bpm), pattern, out)
    }

    pub fn set_swing<O: DrumOutput + ?Sized>(&mut self, swing: u32, pattern: &Pattern, out: &mut O) -> Option<Tick> {
        self.set_tempo(self.tempo.with_swing(swing), pattern, out)
    }

    #[cfg(test)]
    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    #[cfg(test)]
    pub fn current_step(&self) -> usize {
        self.step
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    #[cfg(test)]
    pub fn pending(&self) -> Option<TimerHandle> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    // play, move the cursor, advance, reschedule
    fn tick<O: DrumOutput + ?Sized>(&mut self, pattern: &Pattern, out: &mut O) -> Tick {
        let step = self.step;
        let kind = pattern.get(step).unwrap_or_default();
        if let Some(drum) = kind.drum() {
            out.trigger(drum, LOOKAHEAD);
        }
        self.cursor = step;
        self.step = (step + 1) % STEPS;

        let next_delay = self.tempo.delay_before(self.step);
        debug_assert!(self.pending.is_none(), "tick with a timer still pending");
        self.pending = Some(self.scheduler.schedule(next_delay));
        log::trace!("step {step} {kind:?}, next in {next_delay:?}");
        Tick { step, kind, next_delay }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}
