//! Sample source adapter.
//!
//! Turns a stored capture into a [`SampleBuffer`]: WAV files become a mono,
//! peak-normalised real buffer; anything else is read as interleaved
//! little-endian complex `f32` samples. Both readers stop at a fixed cap so the
//! cost of one analysis run is bounded regardless of the capture length.

mod raw;
mod wav;

use log::debug;
use num_complex::Complex32;
use std::path::{Path, PathBuf};

use crate::interface::RecordingMeta;

/// Sample rate assumed for raw captures whose recording carries none.
pub const DEFAULT_RAW_SAMPLE_RATE: u32 = 2_048_000;
/// Real buffers keep at most this many seconds at their native rate.
pub const MAX_REAL_SECONDS: usize = 30;
/// Raw complex buffers keep at most this many samples.
pub const MAX_COMPLEX_SAMPLES: usize = 1_000_000;
/// Interleaved `f32` real/imaginary pair.
pub const BYTES_PER_COMPLEX_SAMPLE: u64 = 8;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("unreadable capture {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("capture {path} contains no samples")]
    Empty { path: PathBuf },
}

impl LoadError {
    pub(crate) fn unreadable(path: &Path, reason: impl ToString) -> Self {
        LoadError::Unreadable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    Real,
    Complex,
}

/// On-disk layout, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    Wav,
    RawComplex,
}

impl CaptureFormat {
    pub fn from_path(path: &Path) -> Self {
        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("wav"))
            .unwrap_or(false);
        if is_wav {
            CaptureFormat::Wav
        } else {
            CaptureFormat::RawComplex
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Real(Vec<f32>),
    Complex(Vec<Complex32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::Real(values) => values.len(),
            Samples::Complex(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> SampleKind {
        match self {
            Samples::Real(_) => SampleKind::Real,
            Samples::Complex(_) => SampleKind::Complex,
        }
    }
}

/// Samples of one capture, ready for spectral analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Samples,
    sample_rate: u32,
    center_frequency: Option<f64>,
    source_len: usize,
}

impl SampleBuffer {
    /// Buffer built from in-memory samples. `source_len` equals the sample count.
    pub fn new(samples: Samples, sample_rate: u32) -> Self {
        let source_len = samples.len();
        Self {
            samples,
            sample_rate,
            center_frequency: None,
            source_len,
        }
    }

    pub fn with_center_frequency(mut self, center_frequency: Option<f64>) -> Self {
        self.center_frequency = center_frequency;
        self
    }

    pub(crate) fn with_source_len(mut self, source_len: usize) -> Self {
        self.source_len = source_len;
        self
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn kind(&self) -> SampleKind {
        self.samples.kind()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn center_frequency(&self) -> Option<f64> {
        self.center_frequency
    }

    /// Sample count of the capture before truncation.
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Length of the full capture in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.source_len as f64 / self.sample_rate as f64
    }
}

/// Loads a capture and records the sample rate it was read with on `meta`.
pub fn load(path: &Path, meta: &mut RecordingMeta) -> Result<SampleBuffer, LoadError> {
    let buffer = match CaptureFormat::from_path(path) {
        CaptureFormat::Wav => wav::read_wav(path)?,
        CaptureFormat::RawComplex => {
            let sample_rate = meta.sample_rate.unwrap_or(DEFAULT_RAW_SAMPLE_RATE);
            raw::read_raw(path, sample_rate)?
        }
    };

    if buffer.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    meta.sample_rate = Some(buffer.sample_rate());
    debug!(
        "loaded {} {:?} samples at {} Hz from {}",
        buffer.len(),
        buffer.kind(),
        buffer.sample_rate(),
        path.display()
    );
    Ok(buffer.with_center_frequency(meta.center_frequency))
}

/// Scales a real buffer to unit peak amplitude; all-zero input is left as is.
pub fn normalize_peak(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
    if peak > 0.0 {
        for value in samples.iter_mut() {
            *value /= peak;
        }
    }
}
