//! RFI detection engine.
//!
//! Turns recorded audio or raw IQ captures into discrete interference events
//! (time, frequency, power, bandwidth, confidence, category) and drives the
//! per-recording processing lifecycle that produces them.

pub mod capture;
pub mod coordinator;
pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use capture::{load, SampleBuffer, SampleKind};
pub use coordinator::{Coordinator, JobError};
pub use prelude::{AnalysisConfig, AnalysisPath, ProcessingStage};
pub use processing::AnalysisPipeline;
