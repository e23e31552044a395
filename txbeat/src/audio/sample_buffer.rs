use std::path::Path;

use anyhow::Context;

use super::frame::StereoFrame;

#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>, // the audio data array
}

impl SampleBuffer {
    pub fn duration_secs(&self, sample_rate: u32) -> f64 {
        self.data.len() as f64 / sample_rate as f64
    }

    // Write the buffer to disk as a 32-bit float stereo WAV
    pub fn write_wav(&self, path: &Path, sample_rate: u32) -> anyhow::Result<()> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("could not create {}", path.display()))?;
        for f in &self.data {
            writer.write_sample(f.left)?;
            writer.write_sample(f.right)?;
        }
        writer.finalize()?;
        Ok(())
    }
}
