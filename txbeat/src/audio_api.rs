use std::time::{Duration, Instant};

pub use crate::shared::{AudioStatus, Drum};

// Small buffer between "trigger now" and the sound actually starting, so the
// output device has time to pick the command up.
pub const LOOKAHEAD: Duration = Duration::from_millis(20);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AudioCommand {
    // `at` is when the hit should sound. The engine measures it against the
    // time it picks the command up, so buffer size doesn't move hits around.
    Trigger { drum: Drum, at: Instant },
}

/// Anything the transport can fire drums into.
pub trait DrumOutput {
    /// Make sure the device is open and running. Called on every start.
    fn resume(&mut self) {}

    fn status(&self) -> AudioStatus {
        AudioStatus::Live
    }

    fn trigger(&mut self, drum: Drum, lookahead: Duration);
}

// No device means no sound, but the transport still runs
impl<T: DrumOutput> DrumOutput for Option<T> {
    fn resume(&mut self) {
        if let Some(out) = self {
            out.resume();
        }
    }

    fn status(&self) -> AudioStatus {
        self.as_ref().map_or(AudioStatus::Unavailable, |out| out.status())
    }

    fn trigger(&mut self, drum: Drum, lookahead: Duration) {
        if let Some(out) = self {
            out.trigger(drum, lookahead);
        }
    }
}
