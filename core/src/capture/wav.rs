use hound::{SampleFormat, WavReader};
use std::path::Path;

use super::{normalize_peak, LoadError, SampleBuffer, Samples, MAX_REAL_SECONDS};

/// Reads a WAV capture, averaging channels to mono and keeping the first
/// `MAX_REAL_SECONDS` of audio.
pub(crate) fn read_wav(path: &Path) -> Result<SampleBuffer, LoadError> {
    let reader = WavReader::open(path).map_err(|e| LoadError::unreadable(path, e))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(LoadError::unreadable(path, "header reports a 0 Hz sample rate"));
    }

    let channels = usize::from(spec.channels.max(1));
    let source_frames = reader.duration() as usize;
    let max_frames = spec.sample_rate as usize * MAX_REAL_SECONDS;
    let max_values = max_frames.saturating_mul(channels);

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .take(max_values)
            .collect::<hound::Result<Vec<f32>>>(),
        SampleFormat::Int => reader
            .into_samples::<i32>()
            .take(max_values)
            .map(|sample| sample.map(|value| value as f32))
            .collect::<hound::Result<Vec<f32>>>(),
    }
    .map_err(|e| LoadError::unreadable(path, e))?;

    let mut mono = downmix(&interleaved, channels);
    normalize_peak(&mut mono);

    Ok(SampleBuffer::new(Samples::Real(mono), spec.sample_rate).with_source_len(source_frames))
}

/// Averages interleaved frames; a trailing partial frame is dropped.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
