pub mod classify;
pub mod dedup;
pub mod peaks;
pub mod pipeline;
pub mod spectral;

pub use classify::Classifier;
pub use dedup::dedupe;
pub use peaks::{detect, PeakStage};
pub use pipeline::AnalysisPipeline;
pub use spectral::{estimate, SpectralStage, Spectrogram};
