use num_complex::{Complex32, Complex64};
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::sync::Arc;

/// Helper that wraps a planned `rustfft` transform and its scratch space for
/// reuse across frames of one spectrogram.
pub struct FftHelper {
    fft: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex64::zero(); fft.get_inplace_scratch_len()];
        Self {
            fft,
            buffer: vec![Complex64::zero(); size],
            scratch,
        }
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Transforms a real frame multiplied by `window`. Missing samples are zero.
    pub fn forward_real(&mut self, frame: &[f32], window: &[f64]) -> &[Complex64] {
        for (idx, slot) in self.buffer.iter_mut().enumerate() {
            let value = frame.get(idx).copied().unwrap_or(0.0) as f64;
            let weight = window.get(idx).copied().unwrap_or(1.0);
            *slot = Complex64::new(value * weight, 0.0);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);
        &self.buffer
    }

    /// Transforms a complex frame multiplied by `window`. Missing samples are zero.
    pub fn forward_complex(&mut self, frame: &[Complex32], window: &[f64]) -> &[Complex64] {
        for (idx, slot) in self.buffer.iter_mut().enumerate() {
            let weight = window.get(idx).copied().unwrap_or(1.0);
            *slot = frame
                .get(idx)
                .map(|value| Complex64::new(value.re as f64 * weight, value.im as f64 * weight))
                .unwrap_or_else(Complex64::zero);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);
        &self.buffer
    }
}

/// Sample frequencies of a full FFT, in `numpy.fft.fftfreq` order.
pub fn fftfreq(size: usize, sample_spacing: f64) -> Vec<f64> {
    if size == 0 {
        return Vec::new();
    }
    let scale = 1.0 / (size as f64 * sample_spacing);
    let positive_end = (size - 1) / 2 + 1;
    (0..size)
        .map(|idx| {
            let bin = if idx < positive_end {
                idx as f64
            } else {
                idx as f64 - size as f64
            };
            bin * scale
        })
        .collect()
}

/// Non-negative sample frequencies of a real FFT (`window/2 + 1` bins).
pub fn rfftfreq(size: usize, sample_rate: f64) -> Vec<f64> {
    let resolution = sample_rate / size as f64;
    (0..=size / 2).map(|idx| idx as f64 * resolution).collect()
}

/// Moves the zero-frequency bin to the centre, like `numpy.fft.fftshift`.
pub fn fft_shift<T: Copy>(values: &mut [T]) {
    let len = values.len();
    values.rotate_right(len / 2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft_helper_returns_same_length() {
        let mut helper = FftHelper::new(4);
        assert_eq!(helper.size(), 4);
        let output = helper.forward_real(&[1.0, 0.0, -1.0, 0.0], &[1.0; 4]);
        assert_eq!(output.len(), 4);
        assert!((output[1].re - 2.0).abs() < 1e-12);
        assert!(output[0].norm() < 1e-12);
    }

    #[test]
    fn complex_tone_lands_in_its_bin() {
        let size = 8;
        let frame: Vec<Complex32> = (0..size)
            .map(|n| {
                let phase = 2.0 * std::f32::consts::PI * 2.0 * n as f32 / size as f32;
                Complex32::new(phase.cos(), phase.sin())
            })
            .collect();
        let mut helper = FftHelper::new(size);
        let output = helper.forward_complex(&frame, &[1.0; 8]);
        let peak = output
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
            .map(|(idx, _)| idx);
        assert_eq!(peak, Some(2));
    }

    #[test]
    fn fftfreq_matches_numpy_layout() {
        assert_eq!(fftfreq(4, 0.25), vec![0.0, 1.0, -2.0, -1.0]);
        assert_eq!(fftfreq(5, 1.0), vec![0.0, 0.2, 0.4, -0.4, -0.2]);
    }

    #[test]
    fn shifted_frequencies_are_monotonic() {
        let mut freqs = fftfreq(8, 1.0 / 8.0);
        fft_shift(&mut freqs);
        assert_eq!(freqs, vec![-4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn rfftfreq_covers_nyquist() {
        assert_eq!(rfftfreq(8, 800.0), vec![0.0, 100.0, 200.0, 300.0, 400.0]);
    }
}
