pub mod detection;
pub mod recording;

pub use detection::{Detection, InterferenceKind, Peak};
pub use recording::{
    JobStatus, JobUpdate, ProcessingJob, Recording, RecordingId, RecordingMeta, RecordingUpdate,
};
