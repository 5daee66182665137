use serde::{Deserialize, Serialize};

use crate::capture::SampleKind;
use crate::processing::classify::Classifier;

/// Proximity rule used by the deduplicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DedupParams {
    pub time_threshold: f64,
    pub freq_threshold: f64,
    /// Acceptance stops once this many detections are kept.
    pub max_output: Option<usize>,
}

/// Constants for the real-valued (audio-rate) path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleParams {
    pub max_window: usize,
    pub hop_divisor: usize,
    pub floor_db: f64,
    pub ceiling_db: f64,
    pub threshold_sigmas: f64,
    pub subsample_stride: usize,
    pub max_candidates: usize,
    pub half_power_drop_db: f64,
    pub dedup: DedupParams,
}

impl Default for SimpleParams {
    fn default() -> Self {
        Self {
            max_window: 2048,
            hop_divisor: 4,
            floor_db: -100.0,
            ceiling_db: 50.0,
            threshold_sigmas: 2.0,
            subsample_stride: 5,
            max_candidates: 100,
            half_power_drop_db: 3.0,
            dedup: DedupParams {
                time_threshold: 0.1,
                freq_threshold: 1_000.0,
                max_output: Some(50),
            },
        }
    }
}

/// Constants for the complex-valued (raw IQ) path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexParams {
    pub window: usize,
    pub hop_divisor: usize,
    pub threshold_sigmas: f64,
    pub max_candidates: usize,
    pub half_power_drop_db: f64,
    pub dedup: DedupParams,
}

impl Default for ComplexParams {
    fn default() -> Self {
        Self {
            window: 4096,
            hop_divisor: 4,
            threshold_sigmas: 3.0,
            max_candidates: 200,
            half_power_drop_db: 6.0,
            dedup: DedupParams {
                time_threshold: 0.1,
                freq_threshold: 10_000.0,
                max_output: None,
            },
        }
    }
}

/// Detection path, picked from the kind of samples being analysed.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPath {
    Simple(SimpleParams),
    Complex(ComplexParams),
}

impl AnalysisPath {
    pub fn kind(&self) -> SampleKind {
        match self {
            AnalysisPath::Simple(_) => SampleKind::Real,
            AnalysisPath::Complex(_) => SampleKind::Complex,
        }
    }

    pub fn classifier(&self) -> Classifier {
        match self {
            AnalysisPath::Simple(_) => Classifier::Fast,
            AnalysisPath::Complex(_) => Classifier::Detailed,
        }
    }

    pub fn dedup(&self) -> &DedupParams {
        match self {
            AnalysisPath::Simple(params) => &params.dedup,
            AnalysisPath::Complex(params) => &params.dedup,
        }
    }

    pub fn half_power_drop_db(&self) -> f64 {
        match self {
            AnalysisPath::Simple(params) => params.half_power_drop_db,
            AnalysisPath::Complex(params) => params.half_power_drop_db,
        }
    }
}

/// Per-path constants shared by every run of a coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub simple: SimpleParams,
    pub complex: ComplexParams,
}

impl AnalysisConfig {
    pub fn path_for(&self, kind: SampleKind) -> AnalysisPath {
        match kind {
            SampleKind::Real => AnalysisPath::Simple(self.simple.clone()),
            SampleKind::Complex => AnalysisPath::Complex(self.complex.clone()),
        }
    }
}

/// Common error type for the estimator and detector stages.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("invalid spectrogram dimensions: {0}")]
    InvalidDimensions(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type StageResult<T> = Result<T, AnalysisError>;

/// A single step of the analysis chain.
pub trait ProcessingStage {
    type Input: ?Sized;
    type Output;

    fn name(&self) -> &'static str;
    fn execute(&mut self, input: &Self::Input) -> StageResult<Self::Output>;
}
