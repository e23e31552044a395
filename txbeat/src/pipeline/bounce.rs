// Offline render: run the real transport on a virtual clock and mix the hits
// into a buffer, so a loop can be written to disk faster than real time.

use std::time::{Duration, Instant};

use crate::audio::{Engine, SampleBuffer, StereoFrame};
use crate::audio_api::{AudioCommand, Drum, DrumOutput, LOOKAHEAD};
use crate::sequencer::{Tempo, Transport, VirtualScheduler};
use crate::shared::STEPS;

use super::pattern::Pattern;

// long enough for the last kick to ring out
const RING_OUT: Duration = Duration::from_millis(150);

// Collects hits until the bounce loop stamps them with the virtual time
#[derive(Default)]
struct HitLog {
    fresh: Vec<(Drum, Duration)>,
}

impl DrumOutput for HitLog {
    fn trigger(&mut self, drum: Drum, lookahead: Duration) {
        self.fresh.push((drum, lookahead));
    }
}

struct Hit {
    at: Duration,
    drum: Drum,
    lookahead: Duration,
}

/// Play `loops` passes over the pattern and return the mixed audio.
pub fn bounce(pattern: &Pattern, tempo: Tempo, loops: usize, sample_rate: u32) -> SampleBuffer {
    let mut transport = Transport::new(VirtualScheduler::new(), tempo);
    let mut log = HitLog::default();
    let mut hits = Vec::new();
    let ticks = loops * STEPS;

    let mut loop_end = Duration::ZERO;
    if ticks > 0 {
        if let Some(tick) = transport.start(pattern, &mut log) {
            loop_end = tick.next_delay;
        }
        stamp(Duration::ZERO, &mut log, &mut hits);
    }
    for _ in 1..ticks {
        let Some(handle) = transport.scheduler_mut().advance() else { break };
        let now = transport.scheduler().now();
        if let Some(tick) = transport.on_timer(handle, pattern, &mut log) {
            log::trace!("bounce {:?} step {} at {now:?}", tick.kind, tick.step);
            loop_end = now + tick.next_delay;
        }
        stamp(now, &mut log, &mut hits);
    }
    transport.stop();

    let length = if ticks > 0 { loop_end + LOOKAHEAD + RING_OUT } else { Duration::ZERO };
    render_hits(&hits, length, sample_rate)
}

fn stamp(now: Duration, log: &mut HitLog, hits: &mut Vec<Hit>) {
    hits.extend(log.fresh.drain(..).map(|(drum, lookahead)| Hit { at: now, drum, lookahead }));
}

fn frame_at(t: Duration, sample_rate: u32) -> usize {
    (t.as_secs_f64() * sample_rate as f64).round() as usize
}

fn render_hits(hits: &[Hit], length: Duration, sample_rate: u32) -> SampleBuffer {
    let mut engine = Engine::new(sample_rate as f32);
    let mut data = vec![StereoFrame::zero(); frame_at(length, sample_rate)];
    // virtual time zero, only differences between instants matter
    let origin = Instant::now();
    let mut cursor = 0;
    for hit in hits {
        let at = frame_at(hit.at, sample_rate).min(data.len());
        engine.render_block(&mut data[cursor..at]);
        cursor = at;
        let now = origin + hit.at;
        engine.handle_cmd(AudioCommand::Trigger { drum: hit.drum, at: now + hit.lookahead }, now);
    }
    engine.render_block(&mut data[cursor..]);
    log::info!("bounced {} hits into {} frames", hits.len(), data.len());
    SampleBuffer { data }
}
