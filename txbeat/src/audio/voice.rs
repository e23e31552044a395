// The two drum sounds, rendered once up front, plus the tiny playback voice
// that walks through them.

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::shared::Drum;

// kick: 150Hz -> 52Hz sine sweep
const KICK_START_HZ: f32 = 150.0;
const KICK_END_HZ: f32 = 52.0;
const KICK_SWEEP_SECS: f32 = 0.08;
const KICK_PEAK: f32 = 0.95;
const KICK_ATTACK_SECS: f32 = 0.01;
const KICK_DECAY_END_SECS: f32 = 0.12;
const KICK_LENGTH_SECS: f32 = 0.14;

// snare: high-passed noise burst
const SNARE_CUTOFF_HZ: f32 = 1100.0;
const SNARE_PEAK: f32 = 0.75;
const SNARE_ATTACK_SECS: f32 = 0.005;
const SNARE_DECAY_END_SECS: f32 = 0.11;
const SNARE_LENGTH_SECS: f32 = 0.13;
const SNARE_SEED: u64 = 0x5a4e_4152_45; // same noise every hit

// exponential ramps can't start or end at zero
const FLOOR: f32 = 0.0001;

/// Pre-rendered mono buffers for both drums at one sample rate.
#[derive(Clone, Debug)]
pub struct DrumKit {
    kick: Vec<f32>,
    snare: Vec<f32>,
}

impl DrumKit {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            kick: render_kick(sample_rate),
            snare: render_snare(sample_rate),
        }
    }

    pub fn sound(&self, drum: Drum) -> &[f32] {
        match drum {
            Drum::Kick => &self.kick,
            Drum::Snare => &self.snare,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Voice {
    pub drum: Drum,
    pub active: bool,
    wait: usize, // frames of lookahead left before sound starts
    pos: usize,
}

impl Voice {
    pub fn idle() -> Self {
        Self {
            drum: Drum::Kick,
            active: false,
            wait: 0,
            pos: 0,
        }
    }

    pub fn new(drum: Drum, wait: usize) -> Self {
        Self {
            drum,
            active: true,
            wait,
            pos: 0,
        }
    }

    pub fn next_sample(&mut self, sound: &[f32]) -> f32 {
        if !self.active {
            return 0.0;
        }
        if self.wait > 0 {
            self.wait -= 1;
            return 0.0;
        }
        match sound.get(self.pos) {
            Some(s) => {
                self.pos += 1;
                *s
            }
            None => {
                self.active = false;
                0.0
            }
        }
    }
}

fn frames(secs: f32, sample_rate: f32) -> usize {
    (secs * sample_rate).round() as usize
}

// value that moves exponentially from `from` to `to` as `t` goes 0..1
fn exp_ramp(from: f32, to: f32, t: f32) -> f32 {
    from * (to / from).powf(t.clamp(0.0, 1.0))
}

// fast attack up to `peak`, then exponential decay back to the floor
fn envelope(t: f32, peak: f32, attack: f32, decay_end: f32) -> f32 {
    if t < attack {
        exp_ramp(FLOOR, peak, t / attack)
    } else {
        exp_ramp(peak, FLOOR, (t - attack) / (decay_end - attack))
    }
}

fn render_kick(sample_rate: f32) -> Vec<f32> {
    let len = frames(KICK_LENGTH_SECS, sample_rate);
    let mut phase = 0.0f32;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let freq = exp_ramp(KICK_START_HZ, KICK_END_HZ, t / KICK_SWEEP_SECS);
            let amp = envelope(t, KICK_PEAK, KICK_ATTACK_SECS, KICK_DECAY_END_SECS);
            let out = phase.sin() * amp;
            phase = (phase + TAU * freq / sample_rate) % TAU;
            out
        })
        .collect()
}

fn render_snare(sample_rate: f32) -> Vec<f32> {
    let len = frames(SNARE_LENGTH_SECS, sample_rate);
    let mut rng = Pcg32::seed_from_u64(SNARE_SEED);
    let mut hp = HighPass::new(SNARE_CUTOFF_HZ, sample_rate);
    (0..len)
        .map(|i| {
            let fade = 1.0 - i as f32 / len as f32;
            let noise = rng.gen_range(-1.0f32..1.0) * fade;
            let t = i as f32 / sample_rate;
            hp.process(noise) * envelope(t, SNARE_PEAK, SNARE_ATTACK_SECS, SNARE_DECAY_END_SECS)
        })
        .collect()
}

// RBJ cookbook biquad, high-pass, Q = 1/sqrt(2)
struct HighPass {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl HighPass {
    fn new(cutoff: f32, sample_rate: f32) -> Self {
        let w0 = TAU * cutoff / sample_rate;
        let cos = w0.cos();
        let alpha = w0.sin() / (2.0 * std::f32::consts::FRAC_1_SQRT_2);
        let a0 = 1.0 + alpha;
        Self {
            b0: (1.0 + cos) / 2.0 / a0,
            b1: -(1.0 + cos) / a0,
            b2: (1.0 + cos) / 2.0 / a0,
            a1: -2.0 * cos / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2 - self.a1 * self.y1 - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}
