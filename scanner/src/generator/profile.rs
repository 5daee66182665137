use anyhow::Context;
use clap::ValueEnum;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rficore::capture::DEFAULT_RAW_SAMPLE_RATE;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::generator::template::{complex_tone, real_tone};

/// Layout of a synthetic capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    /// 16-bit mono WAV.
    Audio,
    /// Interleaved little-endian `f32` IQ pairs.
    Iq,
}

/// Configuration for generating a synthetic capture: one tone plus uniform noise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub kind: CaptureKind,
    pub sample_rate: u32,
    pub tone_hz: f32,
    pub amplitude: f32,
    pub noise: f32,
    /// Seconds.
    pub duration: f32,
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self::for_kind(CaptureKind::Audio)
    }
}

impl SynthConfig {
    pub fn for_kind(kind: CaptureKind) -> Self {
        let sample_rate = match kind {
            CaptureKind::Audio => 48_000,
            CaptureKind::Iq => DEFAULT_RAW_SAMPLE_RATE,
        };
        Self {
            kind,
            sample_rate,
            tone_hz: 5_000.0,
            amplitude: 0.8,
            noise: 0.01,
            duration: 2.0,
            seed: 0,
        }
    }

    fn sample_count(&self) -> anyhow::Result<usize> {
        let count = (self.duration.max(0.0) as f64 * self.sample_rate as f64).round();
        if count < 1.0 {
            anyhow::bail!(
                "{} s at {} Hz produces no samples",
                self.duration,
                self.sample_rate
            );
        }
        Ok(count as usize)
    }
}

fn jitter(rng: &mut StdRng, noise: f32) -> f32 {
    if noise > 0.0 {
        rng.gen_range(-noise..noise)
    } else {
        0.0
    }
}

/// Writes a synthetic capture to `path` and returns the number of samples written.
pub fn write_capture(path: &Path, config: &SynthConfig) -> anyhow::Result<usize> {
    let count = config.sample_count()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }
    let mut rng = StdRng::seed_from_u64(config.seed);

    match config.kind {
        CaptureKind::Audio => {
            let spec = hound::WavSpec {
                channels: 1,
                sample_rate: config.sample_rate,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let mut writer = hound::WavWriter::create(path, spec)
                .with_context(|| format!("creating WAV {}", path.display()))?;
            for value in real_tone(count, config.sample_rate, config.tone_hz, config.amplitude) {
                let sample = (value + jitter(&mut rng, config.noise)).clamp(-1.0, 1.0);
                writer
                    .write_sample((sample * i16::MAX as f32) as i16)
                    .context("writing WAV sample")?;
            }
            writer.finalize().context("finalizing WAV")?;
        }
        CaptureKind::Iq => {
            let file = File::create(path)
                .with_context(|| format!("creating IQ capture {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            for (re, im) in complex_tone(count, config.sample_rate, config.tone_hz, config.amplitude)
            {
                let re = re + jitter(&mut rng, config.noise);
                let im = im + jitter(&mut rng, config.noise);
                writer.write_all(&re.to_le_bytes())?;
                writer.write_all(&im.to_le_bytes())?;
            }
            writer.flush().context("flushing IQ capture")?;
        }
    }

    Ok(count)
}
