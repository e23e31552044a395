use std::time::Duration;

pub const MIN_BPM: u32 = 40;
pub const MAX_BPM: u32 = 220;
pub const MAX_SWING: u32 = 60; // percent
pub const DEFAULT_BPM: u32 = 120;
pub const DEFAULT_SWING: u32 = 0;

/// Global tempo and swing. Out of range values are clamped on the way in,
/// so anything holding a `Tempo` can trust it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tempo {
    bpm: u32,
    swing: u32,
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(DEFAULT_BPM, DEFAULT_SWING)
    }
}

impl Tempo {
    pub fn new(bpm: u32, swing: u32) -> Self {
        Self {
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
            swing: swing.min(MAX_SWING),
        }
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn swing(&self) -> u32 {
        self.swing
    }

    pub fn with_bpm(self, bpm: u32) -> Self {
        Self::new(bpm, self.swing)
    }

    pub fn with_swing(self, swing: u32) -> Self {
        Self::new(self.bpm, swing)
    }

    /// One sixteenth in milliseconds: a quarter of a beat.
    pub fn step_ms(&self) -> f64 {
        (60_000.0 / self.bpm as f64) / 4.0
    }

    /// Odd sixteenths get pushed late by `swing`% of a step.
    pub fn swing_offset_ms(&self, step: usize) -> f64 {
        if step % 2 == 1 {
            self.step_ms() * (self.swing as f64 / 100.0)
        } else {
            0.0
        }
    }

    /// Wait before playing `upcoming`. Parity comes from the step about to
    /// play, not the one that just played.
    pub fn delay_ms_before(&self, upcoming: usize) -> f64 {
        self.step_ms() + self.swing_offset_ms(upcoming)
    }

    pub fn delay_before(&self, upcoming: usize) -> Duration {
        Duration::from_secs_f64(self.delay_ms_before(upcoming) / 1000.0)
    }
}
