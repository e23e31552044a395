use std::time::Instant;

use crate::audio_api::AudioCommand;

use super::frame::StereoFrame;
use super::voice::{DrumKit, Voice};

const MAX_VOICES: usize = 16; // hard cap so we wont malloc in audio callback

pub struct Engine {
    sample_rate: f32,
    kit: DrumKit,
    voices: [Voice; MAX_VOICES], // fixed pool of voices
}

impl Engine {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            kit: DrumKit::new(sample_rate),
            voices: [Voice::idle(); MAX_VOICES],
        }
    }

    /// `now` is the time of the next frame this engine will produce.
    pub fn handle_cmd(&mut self, cmd: AudioCommand, now: Instant) {
        match cmd {
            AudioCommand::Trigger { drum, at } => {
                let ahead = at.saturating_duration_since(now);
                let wait = (ahead.as_secs_f32() * self.sample_rate).round() as usize;
                // what slot do we write to?
                let slot = self.voices.iter().position(|v| !v.active).unwrap_or(0);
                self.voices[slot] = Voice::new(drum, wait);
            }
        }
    }

    pub fn next_frame(&mut self) -> StereoFrame {
        let kit = &self.kit;
        let mut out = 0.0f32;
        for v in self.voices.iter_mut().filter(|v| v.active) {
            out += v.next_sample(kit.sound(v.drum));
        }
        StereoFrame::mono(out.clamp(-1.0, 1.0))
    }

    pub fn render_block(&mut self, frames: &mut [StereoFrame]) {
        for f in frames.iter_mut() {
            *f = self.next_frame();
        }
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }
}
