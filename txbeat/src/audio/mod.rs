use std::time::{Duration, Instant};

use anyhow::Context;
use crossbeam_channel::Sender;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::{AudioCommand, AudioStatus, Drum, DrumOutput};

mod engine;
mod frame;
mod sample_buffer;
mod voice;

pub use engine::Engine;
pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.tx.try_send(cmd);
    }
}

impl DrumOutput for AudioHandle {
    // some backends park the stream when idle, so kick it on every start
    fn resume(&mut self) {
        if let Err(e) = self.output_stream.play() {
            log::warn!("could not resume output stream: {e}");
        }
    }

    fn trigger(&mut self, drum: Drum, lookahead: Duration) {
        self.send(AudioCommand::Trigger { drum, at: Instant::now() + lookahead });
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream = build_output_stream_f32(
                &device, &config.into(), rx, sample_rate as f32, channels,
            )?;
            output_stream.play().context("failed to play output stream")?;
            log::info!("audio out: {sample_rate}Hz, {channels} channels");

            Ok(AudioHandle { tx, output_stream })
        }
        _ => anyhow::bail!("unsupported sample format (only f32 supported for now)"),
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: crossbeam_channel::Receiver<AudioCommand>,
    sample_rate: f32,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(sample_rate);

    let err_fn = |err: cpal::StreamError| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            // the first frame of this block stands for "now"
            let now = Instant::now();
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd, now);
            }
            for out in data.chunks_mut(channels) {
                let frame = engine.next_frame();
                for (ch, sample) in out.iter_mut().enumerate() {
                    *sample = if ch % 2 == 0 { frame.left } else { frame.right };
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

/// Output device opened on first play. If that fails we remember it, say so
/// once, and carry on silently.
#[derive(Default)]
pub struct LazyAudio {
    handle: Option<AudioHandle>,
    failed: bool,
}

impl LazyAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrumOutput for LazyAudio {
    fn status(&self) -> AudioStatus {
        match (&self.handle, self.failed) {
            (Some(_), _) => AudioStatus::Live,
            (None, true) => AudioStatus::Unavailable,
            (None, false) => AudioStatus::Idle,
        }
    }

    fn resume(&mut self) {
        if self.handle.is_none() && !self.failed {
            match start_audio() {
                Ok(handle) => self.handle = Some(handle),
                Err(e) => {
                    log::warn!("audio unavailable, playing silently: {e:#}");
                    self.failed = true;
                }
            }
        }
        self.handle.resume();
    }

    fn trigger(&mut self, drum: Drum, lookahead: Duration) {
        self.handle.trigger(drum, lookahead);
    }
}
