use ndarray::{Array2, ArrayView2};
use num_complex::Complex32;

use crate::capture::{SampleBuffer, SampleKind, Samples};
use crate::math::fft::{fft_shift, fftfreq, rfftfreq, FftHelper};
use crate::math::window::hann;
use crate::prelude::{
    AnalysisError, AnalysisPath, ComplexParams, ProcessingStage, SimpleParams, StageResult,
};
use crate::telemetry::log::LogManager;

/// Floor added to linear power before taking the logarithm.
pub const POWER_EPSILON: f64 = 1e-10;

/// Time-frequency power grid in dB, indexed `(frequency_bin, time_frame)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    power_db: Array2<f64>,
    frequencies: Vec<f64>,
    times: Vec<f64>,
    sample_rate: f64,
    window_size: usize,
    kind: SampleKind,
}

impl Spectrogram {
    pub fn new(
        power_db: Array2<f64>,
        frequencies: Vec<f64>,
        times: Vec<f64>,
        sample_rate: f64,
        window_size: usize,
        kind: SampleKind,
    ) -> StageResult<Self> {
        let (bins, frames) = power_db.dim();
        if bins == 0 || frames == 0 {
            return Err(AnalysisError::InvalidDimensions(format!(
                "{} bins x {} frames",
                bins, frames
            )));
        }
        if frequencies.len() != bins || times.len() != frames {
            return Err(AnalysisError::InvalidDimensions(format!(
                "grid is {} x {} but axes are {} x {}",
                bins,
                frames,
                frequencies.len(),
                times.len()
            )));
        }
        if !is_non_decreasing(&frequencies) || !is_non_decreasing(&times) {
            return Err(AnalysisError::InvalidInput(
                "spectrogram axes must be non-decreasing".into(),
            ));
        }
        Ok(Self {
            power_db,
            frequencies,
            times,
            sample_rate,
            window_size,
            kind,
        })
    }

    pub fn power_db(&self) -> ArrayView2<'_, f64> {
        self.power_db.view()
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn kind(&self) -> SampleKind {
        self.kind
    }

    pub fn bins(&self) -> usize {
        self.frequencies.len()
    }

    pub fn frames(&self) -> usize {
        self.times.len()
    }

    /// Flattened copy of every cell, for threshold statistics.
    pub fn values(&self) -> Vec<f64> {
        self.power_db.iter().copied().collect()
    }
}

fn is_non_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] <= pair[1])
}

/// `floor((len - window) / hop) + 1`, rejecting grids with no frames.
pub fn frame_count(len: usize, window: usize, hop: usize) -> StageResult<usize> {
    if window == 0 || hop == 0 {
        return Err(AnalysisError::InvalidDimensions(format!(
            "window {} with hop {}",
            window, hop
        )));
    }
    if len < window {
        return Err(AnalysisError::InvalidDimensions(format!(
            "{} samples cannot fill a {}-sample window",
            len, window
        )));
    }
    Ok((len - window) / hop + 1)
}

fn to_db(power: f64) -> f64 {
    10.0 * (power + POWER_EPSILON).log10()
}

/// Computes the spectrogram variant matching `path`.
pub fn estimate(buffer: &SampleBuffer, path: &AnalysisPath) -> StageResult<Spectrogram> {
    let sample_rate = buffer.sample_rate();
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput("sample rate is zero".into()));
    }
    match (buffer.samples(), path) {
        (Samples::Real(samples), AnalysisPath::Simple(params)) => {
            estimate_real(samples, sample_rate as f64, params)
        }
        (Samples::Complex(samples), AnalysisPath::Complex(params)) => {
            estimate_complex(samples, sample_rate as f64, params)
        }
        (samples, _) => Err(AnalysisError::InvalidInput(format!(
            "{:?} samples do not match the {:?} path",
            samples.kind(),
            path.kind()
        ))),
    }
}

fn estimate_real(
    samples: &[f32],
    sample_rate: f64,
    params: &SimpleParams,
) -> StageResult<Spectrogram> {
    if !(params.floor_db <= params.ceiling_db) {
        return Err(AnalysisError::InvalidInput(format!(
            "dB floor {} exceeds ceiling {}",
            params.floor_db, params.ceiling_db
        )));
    }
    let window = params.max_window.min(samples.len() / 4);
    let hop = window / params.hop_divisor.max(1);
    let frames = frame_count(samples.len(), window, hop)?;

    let taper = hann(window, true);
    let mut fft = FftHelper::new(window);
    let bins = fft.size() / 2 + 1;
    let mut power_db = Array2::<f64>::zeros((bins, frames));

    for t_idx in 0..frames {
        let start = t_idx * hop;
        let spectrum = fft.forward_real(&samples[start..start + window], &taper);
        for (f_idx, value) in spectrum.iter().take(bins).enumerate() {
            power_db[[f_idx, t_idx]] =
                to_db(value.norm_sqr()).clamp(params.floor_db, params.ceiling_db);
        }
    }

    let times = frame_times(frames, hop, sample_rate);
    Spectrogram::new(
        power_db,
        rfftfreq(window, sample_rate),
        times,
        sample_rate,
        window,
        SampleKind::Real,
    )
}

fn estimate_complex(
    samples: &[Complex32],
    sample_rate: f64,
    params: &ComplexParams,
) -> StageResult<Spectrogram> {
    let window = params.window;
    let hop = window / params.hop_divisor.max(1);
    let frames = frame_count(samples.len(), window, hop)?;

    let taper = hann(window, false);
    let mut fft = FftHelper::new(window);
    let mut power_db = Array2::<f64>::zeros((window, frames));
    let half = window / 2;

    for t_idx in 0..frames {
        let start = t_idx * hop;
        let spectrum = fft.forward_complex(&samples[start..start + window], &taper);
        for f_idx in 0..window {
            // fftshift: output bin f_idx reads input bin (f_idx + half) mod window
            let source = (f_idx + window - half) % window;
            power_db[[f_idx, t_idx]] = to_db(spectrum[source].norm_sqr());
        }
    }

    let mut frequencies = fftfreq(window, 1.0 / sample_rate);
    fft_shift(&mut frequencies);
    let times = frame_times(frames, hop, sample_rate);
    Spectrogram::new(
        power_db,
        frequencies,
        times,
        sample_rate,
        window,
        SampleKind::Complex,
    )
}

fn frame_times(frames: usize, hop: usize, sample_rate: f64) -> Vec<f64> {
    (0..frames)
        .map(|idx| (idx * hop) as f64 / sample_rate)
        .collect()
}

/// Spectral estimation as a pipeline stage.
pub struct SpectralStage {
    path: AnalysisPath,
    logger: LogManager,
}

impl SpectralStage {
    pub fn new(path: AnalysisPath) -> Self {
        Self {
            path,
            logger: LogManager::new("spectral"),
        }
    }
}

impl ProcessingStage for SpectralStage {
    type Input = SampleBuffer;
    type Output = Spectrogram;

    fn name(&self) -> &'static str {
        "spectral"
    }

    fn execute(&mut self, input: &SampleBuffer) -> StageResult<Spectrogram> {
        let spectrogram = estimate(input, &self.path)?;
        self.logger.record(&format!(
            "{} bins x {} frames (window {})",
            spectrogram.bins(),
            spectrogram.frames(),
            spectrogram.window_size()
        ));
        Ok(spectrogram)
    }
}
