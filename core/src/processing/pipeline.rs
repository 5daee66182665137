use crate::capture::SampleBuffer;
use crate::interface::Detection;
use crate::prelude::{AnalysisConfig, ProcessingStage, StageResult};
use crate::processing::dedup::dedupe;
use crate::processing::peaks::PeakStage;
use crate::processing::spectral::SpectralStage;
use crate::telemetry::log::LogManager;

/// Spectral estimation, peak detection, classification and deduplication
/// for one buffer, on the path matching its sample kind.
#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, buffer: &SampleBuffer) -> StageResult<Vec<Detection>> {
        let logger = LogManager::new("pipeline");
        let path = self.config.path_for(buffer.kind());

        let mut spectral = SpectralStage::new(path.clone());
        let mut peak_stage = PeakStage::new(path.clone());
        let stages = format!("{} -> {}", spectral.name(), peak_stage.name());

        let spectrogram = spectral.execute(buffer)?;
        let peaks = peak_stage.execute(&spectrogram)?;

        let classifier = path.classifier();
        let classified: Vec<Detection> = peaks
            .into_iter()
            .map(|peak| {
                let category = classifier.classify(peak.frequency, peak.power_level, peak.bandwidth);
                Detection::new(peak, category)
            })
            .collect();
        let candidates = classified.len();

        let detections = dedupe(classified, path.dedup());
        logger.record(&format!(
            "{:?} path ({}): {} candidates, {} after dedup",
            path.kind(),
            stages,
            candidates,
            detections.len()
        ));
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{SampleKind, Samples};
    use crate::interface::InterferenceKind;
    use num_complex::Complex32;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f32::consts::PI;

    fn tone_with_noise(sample_rate: u32, seconds: f32, tone_hz: f32, seed: u64) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        let count = (sample_rate as f32 * seconds) as usize;
        (0..count)
            .map(|n| {
                let t = n as f32 / sample_rate as f32;
                0.98 * (2.0 * PI * tone_hz * t).sin() + rng.gen_range(-0.01..0.01)
            })
            .collect()
    }

    #[test]
    fn strong_tone_is_reported_near_its_frequency() {
        let samples = tone_with_noise(48_000, 2.0, 5_000.0, 7);
        let buffer = SampleBuffer::new(Samples::Real(samples), 48_000);
        let detections = AnalysisPipeline::default().analyze(&buffer).unwrap();

        let bin_width = 48_000.0 / 2048.0;
        assert!(!detections.is_empty());
        assert!(detections.len() <= 50);
        for detection in &detections {
            assert!(
                (detection.frequency - 5_000.0).abs() <= bin_width,
                "{} Hz is more than one bin from the tone",
                detection.frequency
            );
            assert_eq!(detection.category, InterferenceKind::StrongLocal);
            assert!(detection.confidence > 0.0);
            assert!(detection.bandwidth >= bin_width);
        }
    }

    #[test]
    fn stages_chain_spectral_into_peaks() {
        let path = AnalysisConfig::default().path_for(SampleKind::Real);
        let mut spectral = SpectralStage::new(path.clone());
        let mut peak_stage = PeakStage::new(path);
        assert_eq!(spectral.name(), "spectral");
        assert_eq!(peak_stage.name(), "peaks");

        let samples = tone_with_noise(8_000, 1.0, 1_000.0, 3);
        let buffer = SampleBuffer::new(Samples::Real(samples), 8_000);
        let spectrogram = spectral.execute(&buffer).unwrap();
        assert_eq!(spectrogram.window_size(), 2000);
        assert!(!peak_stage.execute(&spectrogram).unwrap().is_empty());
    }

    #[test]
    fn silent_buffer_has_no_detections() {
        let buffer = SampleBuffer::new(Samples::Real(vec![0.0; 96_000]), 48_000);
        assert!(AnalysisPipeline::default().analyze(&buffer).unwrap().is_empty());

        let iq = vec![Complex32::new(0.0, 0.0); 16_384];
        let buffer = SampleBuffer::new(Samples::Complex(iq), 2_048_000);
        assert!(AnalysisPipeline::default().analyze(&buffer).unwrap().is_empty());
    }

    #[test]
    fn complex_tone_uses_detailed_table() {
        let sample_rate = 2_048_000u32;
        let tone = 250_000.0f32;
        let mut rng = StdRng::seed_from_u64(11);
        let iq: Vec<Complex32> = (0..65_536)
            .map(|n| {
                let phase = 2.0 * PI * tone * n as f32 / sample_rate as f32;
                Complex32::new(
                    phase.cos() + rng.gen_range(-0.01..0.01),
                    phase.sin() + rng.gen_range(-0.01..0.01),
                )
            })
            .collect();
        let buffer = SampleBuffer::new(Samples::Complex(iq), sample_rate);
        let detections = AnalysisPipeline::default().analyze(&buffer).unwrap();

        assert!(!detections.is_empty());
        let strongest = detections[0];
        assert!((strongest.frequency - 250_000.0).abs() <= 500.0);
        // labels only the fast table produces
        assert!(detections.iter().all(|d| !matches!(
            d.category,
            InterferenceKind::StrongLocal
                | InterferenceKind::Moderate
                | InterferenceKind::WeakSignal
                | InterferenceKind::TvBroadcast
                | InterferenceKind::UhfTv
                | InterferenceKind::WifiIsm
        )));
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let buffer = SampleBuffer::new(Samples::Real(vec![0.5; 10]), 0);
        assert!(AnalysisPipeline::default().analyze(&buffer).is_err());
    }
}
