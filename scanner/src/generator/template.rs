use std::f32::consts::PI;

/// Real sine tone of `length` samples.
pub fn real_tone(length: usize, sample_rate: u32, frequency: f32, amplitude: f32) -> Vec<f32> {
    let rate = sample_rate.max(1) as f32;
    (0..length)
        .map(|i| amplitude * (2.0 * PI * frequency * i as f32 / rate).sin())
        .collect()
}

/// Complex exponential as `(re, im)` pairs; negative frequencies sit below centre.
pub fn complex_tone(
    length: usize,
    sample_rate: u32,
    frequency: f32,
    amplitude: f32,
) -> Vec<(f32, f32)> {
    let rate = sample_rate.max(1) as f32;
    (0..length)
        .map(|i| {
            let phase = 2.0 * PI * frequency * i as f32 / rate;
            (amplitude * phase.cos(), amplitude * phase.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_tone_starts_at_zero_and_respects_amplitude() {
        let tone = real_tone(400, 8_000, 1_000.0, 0.5);
        assert_eq!(tone.len(), 400);
        assert_eq!(tone[0], 0.0);
        assert!(tone.iter().all(|v| v.abs() <= 0.5 + 1e-6));
        // quarter period of 1 kHz at 8 kHz is two samples
        assert!((tone[2] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn complex_tone_has_constant_magnitude() {
        let tone = complex_tone(64, 1_000, -125.0, 2.0);
        assert!(tone
            .iter()
            .all(|(re, im)| ((re * re + im * im).sqrt() - 2.0).abs() < 1e-5));
    }
}
