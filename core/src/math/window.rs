use std::f64::consts::PI;

/// Hann window. `periodic` selects the DFT-even form used for spectrogram
/// frames; otherwise the symmetric form (`numpy.hanning`).
pub fn hann(size: usize, periodic: bool) -> Vec<f64> {
    match size {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = if periodic { size } else { size - 1 } as f64;
            (0..size)
                .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / denom).cos())
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_hann_has_zero_endpoints() {
        let window = hann(5, false);
        assert!(window[0].abs() < 1e-12);
        assert!(window[4].abs() < 1e-12);
        assert!((window[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn periodic_hann_peaks_at_half_length() {
        let window = hann(8, true);
        assert!(window[0].abs() < 1e-12);
        assert!((window[4] - 1.0).abs() < 1e-12);
        assert!(window[7] > 0.0);
    }
}
