use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub type RecordingId = u64;

/// Read view of a recording handed to the engine by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMeta {
    pub file_path: PathBuf,
    /// Filled in by the sample adapter when the container (or the raw default) supplies it.
    pub sample_rate: Option<u32>,
    pub center_frequency: Option<f64>,
}

impl RecordingMeta {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            sample_rate: None,
            center_frequency: None,
        }
    }
}

/// Stored recording row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: RecordingId,
    pub file_path: PathBuf,
    pub sample_rate: Option<u32>,
    pub center_frequency: Option<f64>,
    pub processed: bool,
    pub rfi_detected: bool,
    pub duration: Option<f64>,
    pub processing_completed_at: Option<DateTime<Utc>>,
}

impl Recording {
    pub fn meta(&self) -> RecordingMeta {
        RecordingMeta {
            file_path: self.file_path.clone(),
            sample_rate: self.sample_rate,
            center_frequency: self.center_frequency,
        }
    }
}

/// Fields written back once a run completes.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingUpdate {
    pub processed: bool,
    pub rfi_detected: bool,
    pub duration: Option<f64>,
    pub sample_rate: Option<u32>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Queue entry tracking one recording's lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingJob {
    pub recording_id: RecordingId,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingJob {
    pub fn pending(recording_id: RecordingId) -> Self {
        Self {
            recording_id,
            status: JobStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    /// Applies a coordinator transition. Unset fields keep their value.
    /// A terminal job is left untouched and `false` is returned.
    pub fn apply(&mut self, update: JobUpdate) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = update.status;
        if update.started_at.is_some() {
            self.started_at = update.started_at;
        }
        if update.completed_at.is_some() {
            self.completed_at = update.completed_at;
        }
        if update.error.is_some() {
            self.error = update.error;
        }
        true
    }
}

/// Job transition emitted by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct JobUpdate {
    pub status: JobStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl JobUpdate {
    pub fn processing(started_at: DateTime<Utc>) -> Self {
        Self {
            status: JobStatus::Processing,
            started_at: Some(started_at),
            completed_at: None,
            error: None,
        }
    }

    pub fn completed(completed_at: DateTime<Utc>) -> Self {
        Self {
            status: JobStatus::Completed,
            started_at: None,
            completed_at: Some(completed_at),
            error: None,
        }
    }

    pub fn failed(completed_at: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            started_at: None,
            completed_at: Some(completed_at),
            error: Some(error.into()),
        }
    }
}
