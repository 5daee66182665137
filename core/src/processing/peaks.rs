use ndarray::ArrayView1;

use crate::interface::Peak;
use crate::math::stats::StatsHelper;
use crate::prelude::{
    AnalysisError, AnalysisPath, ComplexParams, ProcessingStage, SimpleParams, StageResult,
};
use crate::processing::spectral::Spectrogram;
use crate::telemetry::log::LogManager;

/// Used when a column has fewer than two bins to measure a width from.
pub const FALLBACK_BANDWIDTH_HZ: f64 = 1_000.0;

/// Extracts candidate peaks from `spectrogram` using the constants of `path`.
pub fn detect(spectrogram: &Spectrogram, path: &AnalysisPath) -> StageResult<Vec<Peak>> {
    if spectrogram.kind() != path.kind() {
        return Err(AnalysisError::InvalidInput(format!(
            "{:?} spectrogram does not match the {:?} path",
            spectrogram.kind(),
            path.kind()
        )));
    }

    let values = spectrogram.values();
    let max = StatsHelper::max(&values);
    let min = StatsHelper::min(&values);
    // flat grid: nothing stands out
    if !(max > min) {
        return Ok(Vec::new());
    }

    let peaks = match path {
        AnalysisPath::Simple(params) => detect_simple(spectrogram, &values, params),
        AnalysisPath::Complex(params) => detect_complex(spectrogram, &values, max, params),
    };
    Ok(peaks)
}

/// Real path: `median + k·σ`, every n-th candidate in frequency-major order,
/// then the strongest `max_candidates`.
fn detect_simple(spectrogram: &Spectrogram, values: &[f64], params: &SimpleParams) -> Vec<Peak> {
    let median = StatsHelper::median(values);
    let std = StatsHelper::std(values);
    let threshold = median + params.threshold_sigmas * std;
    let stride = params.subsample_stride.max(1);
    let resolution = spectrogram.sample_rate() / spectrogram.window_size().max(1) as f64;

    let power = spectrogram.power_db();
    let frequencies = spectrogram.frequencies();
    let times = spectrogram.times();

    let mut peaks = Vec::new();
    let mut above = 0usize;
    for ((f_idx, t_idx), &level) in power.indexed_iter() {
        if level <= threshold {
            continue;
        }
        if above % stride == 0 {
            let bandwidth = half_power_bandwidth(
                power.column(t_idx),
                f_idx,
                frequencies,
                params.half_power_drop_db,
            )
            .max(resolution);
            peaks.push(Peak {
                timestamp: times[t_idx],
                frequency: frequencies[f_idx],
                power_level: level,
                bandwidth,
                confidence: bounded_confidence(level - threshold, std),
            });
        }
        above += 1;
    }

    if peaks.len() > params.max_candidates {
        peaks.sort_by(|a, b| b.power_level.total_cmp(&a.power_level));
        peaks.truncate(params.max_candidates);
    }
    peaks
}

/// Complex path: `mean + k·σ`, time-major scan that stops at `max_candidates`.
fn detect_complex(
    spectrogram: &Spectrogram,
    values: &[f64],
    max: f64,
    params: &ComplexParams,
) -> Vec<Peak> {
    let mean = StatsHelper::mean(values);
    let std = StatsHelper::std(values);
    let threshold = mean + params.threshold_sigmas * std;

    let power = spectrogram.power_db();
    let frequencies = spectrogram.frequencies();
    let times = spectrogram.times();

    let mut peaks = Vec::new();
    if params.max_candidates == 0 {
        return peaks;
    }
    'scan: for (t_idx, &timestamp) in times.iter().enumerate() {
        let column = power.column(t_idx);
        for (f_idx, &level) in column.iter().enumerate() {
            if level <= threshold {
                continue;
            }
            let bandwidth =
                half_power_bandwidth(column, f_idx, frequencies, params.half_power_drop_db);
            peaks.push(Peak {
                timestamp,
                frequency: frequencies[f_idx],
                power_level: level,
                bandwidth,
                confidence: bounded_confidence(level - threshold, max - threshold),
            });
            if peaks.len() >= params.max_candidates {
                break 'scan;
            }
        }
    }
    peaks
}

/// Width of the region around `peak` that stays above `column[peak] - drop_db`.
///
/// Never narrower than one bin; `FALLBACK_BANDWIDTH_HZ` when the axis has
/// fewer than two bins.
pub fn half_power_bandwidth(
    column: ArrayView1<'_, f64>,
    peak: usize,
    frequencies: &[f64],
    drop_db: f64,
) -> f64 {
    if frequencies.len() < 2 || column.len() < 2 || peak >= column.len() {
        return FALLBACK_BANDWIDTH_HZ;
    }
    let bin_width = (frequencies[1] - frequencies[0]).abs();
    let threshold = column[peak] - drop_db;

    let mut left = peak;
    while left > 0 && column[left] > threshold {
        left -= 1;
    }
    let mut right = peak;
    while right < column.len() - 1 && column[right] > threshold {
        right += 1;
    }

    if right > left {
        (frequencies[right] - frequencies[left]).abs().max(bin_width)
    } else {
        bin_width
    }
}

/// `clamp(excess / scale, 0, 1)`, with a degenerate scale giving zero.
pub fn bounded_confidence(excess: f64, scale: f64) -> f64 {
    if !(scale > 0.0) || !scale.is_finite() {
        return 0.0;
    }
    let ratio = excess / scale;
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Peak detection as a pipeline stage.
pub struct PeakStage {
    path: AnalysisPath,
    logger: LogManager,
}

impl PeakStage {
    pub fn new(path: AnalysisPath) -> Self {
        Self {
            path,
            logger: LogManager::new("peaks"),
        }
    }
}

impl ProcessingStage for PeakStage {
    type Input = Spectrogram;
    type Output = Vec<Peak>;

    fn name(&self) -> &'static str {
        "peaks"
    }

    fn execute(&mut self, input: &Spectrogram) -> StageResult<Vec<Peak>> {
        let peaks = detect(input, &self.path)?;
        self.logger
            .record(&format!("{} candidate peaks", peaks.len()));
        Ok(peaks)
    }
}
