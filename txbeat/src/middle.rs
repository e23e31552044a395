// The middle layer: owns the pattern, the transport and the output, turns
// semantic input events into state changes, and hands the TUI a flat
// DisplayState to draw.

use rand::RngCore;

use crate::audio_api::{AudioStatus, DrumOutput};
use crate::pipeline::identifier::{self, IdentifierError, TxHash};
use crate::pipeline::pattern::Pattern;
use crate::sequencer::{Scheduler, Tempo, TimerHandle, Transport};
use crate::shared::{DisplayState, InputEvent, StepKind, STEPS, STEPS_PER_BAR};

const NOTICE_SECS: f64 = 2.2;

struct Notice {
    text: String,
    remaining: f64,
}

pub struct Middle<S: Scheduler, O: DrumOutput> {
    pattern: Pattern,
    identifier: TxHash,
    transport: Transport<S>,
    output: O,
    selected: usize,
    notice: Option<Notice>,
    home_url: String,
    rng: Box<dyn RngCore>,
    warned_silent: bool,
}

impl<S: Scheduler, O: DrumOutput> Middle<S, O> {
    pub fn new(
        scheduler: S,
        output: O,
        tempo: Tempo,
        start: TxHash,
        home_url: impl Into<String>,
        rng: Box<dyn RngCore>,
    ) -> Self {
        log::info!("starting from {start}");
        Self {
            pattern: Pattern::derive(start.as_str()),
            identifier: start,
            transport: Transport::new(scheduler, tempo),
            output,
            selected: 0,
            notice: None,
            home_url: home_url.into(),
            rng,
            warned_silent: false,
        }
    }

    /// Validate, then swap in the pattern for `raw`. A bad identifier leaves
    /// everything as it was.
    pub fn load_identifier(&mut self, raw: &str) -> Result<(), IdentifierError> {
        let hash = TxHash::parse(raw)?;
        self.pattern = Pattern::derive(hash.as_str());
        log::info!(
            "loaded {hash}: {} kicks, {} snares",
            self.pattern.count(StepKind::Kick),
            self.pattern.count(StepKind::Snare)
        );
        self.identifier = hash;
        self.transport.rewind();
        Ok(())
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Play => {
                if self.transport.start(&self.pattern, &mut self.output).is_some() {
                    self.after_start();
                }
            }
            InputEvent::Stop => self.transport.stop(),
            InputEvent::CycleStep(index) => {
                if let Err(e) = self.pattern.cycle_step(index as usize) {
                    self.notify(e.to_string());
                }
            }
            InputEvent::MoveSelection { dx, dy } => self.move_selection(dx, dy),
            InputEvent::RandomIdentifier => {
                let raw = identifier::random_identifier(&mut self.rng);
                self.submit(&raw);
            }
            InputEvent::SubmitIdentifier(raw) => self.submit(&raw),
            InputEvent::AdjustBpm(delta) => {
                let bpm = offset(self.transport.tempo().bpm(), delta);
                self.transport.set_bpm(bpm, &self.pattern, &mut self.output);
            }
            InputEvent::AdjustSwing(delta) => {
                let swing = offset(self.transport.tempo().swing(), delta);
                self.transport.set_swing(swing, &self.pattern, &mut self.output);
            }
            InputEvent::ShareLink => {
                let url = identifier::share_url(&self.home_url, &self.identifier);
                self.notify(url);
            }
            InputEvent::Quit => {}
        }
    }

    /// A timer came due. Stale handles are the transport's problem.
    pub fn on_timer(&mut self, handle: TimerHandle) {
        self.transport.on_timer(handle, &self.pattern, &mut self.output);
    }

    /// Per-frame housekeeping; `elapsed` is seconds since the last call.
    pub fn tick(&mut self, elapsed: f64) {
        if let Some(notice) = &mut self.notice {
            notice.remaining -= elapsed;
            if notice.remaining <= 0.0 {
                self.notice = None;
            }
        }
    }

    pub fn display_state(&self) -> DisplayState {
        let tempo = self.transport.tempo();
        DisplayState {
            cells: *self.pattern.steps(),
            playhead: self.transport.cursor(),
            selected: self.selected,
            playing: self.transport.is_playing(),
            bpm: tempo.bpm(),
            swing: tempo.swing(),
            identifier: self.identifier.to_string(),
            notice: self.notice.as_ref().map(|n| n.text.clone()),
            audio: self.output.status(),
        }
    }

    #[cfg(test)]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[cfg(test)]
    pub fn transport(&self) -> &Transport<S> {
        &self.transport
    }

    pub fn scheduler(&self) -> &S {
        self.transport.scheduler()
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        self.transport.scheduler_mut()
    }

    fn submit(&mut self, raw: &str) {
        if let Err(e) = self.load_identifier(raw) {
            log::debug!("rejected identifier {raw:?}: {e}");
            self.notify(e.to_string());
        }
    }

    fn after_start(&mut self) {
        if self.output.status() == AudioStatus::Unavailable && !self.warned_silent {
            self.warned_silent = true;
            self.notify("No audio device, playing silently.");
        } else {
            self.notify("Scanner online.");
        }
    }

    fn move_selection(&mut self, dx: i8, dy: i8) {
        let cols = STEPS_PER_BAR as i64;
        let rows = (STEPS / STEPS_PER_BAR) as i64;
        let col = (self.selected as i64 % cols + dx as i64).rem_euclid(cols);
        let row = (self.selected as i64 / cols + dy as i64).rem_euclid(rows);
        self.selected = (row * cols + col) as usize;
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            remaining: NOTICE_SECS,
        });
    }
}

fn offset(value: u32, delta: i32) -> u32 {
    (value as i64 + delta as i64).max(0) as u32
}
