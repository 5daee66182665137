use rficore::coordinator::{ProcessingEvent, QueueStats};
use rficore::interface::{Detection, JobStatus, RecordingId};
use rficore::telemetry::MetricsSnapshot;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of one capture.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingReport {
    pub id: RecordingId,
    pub file_path: PathBuf,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration: Option<f64>,
    pub sample_rate: Option<u32>,
    pub rfi_detected: bool,
    pub detections: Vec<Detection>,
}

/// Everything one scan produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub recordings: Vec<RecordingReport>,
    pub events: Vec<ProcessingEvent>,
    pub queue: QueueStats,
    pub metrics: MetricsSnapshot,
}

impl ScanReport {
    pub fn detection_count(&self) -> usize {
        self.recordings.iter().map(|r| r.detections.len()).sum()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .recordings
            .iter()
            .map(|recording| match &recording.error {
                Some(error) => format!(
                    "{} -> {} ({})",
                    recording.file_path.display(),
                    recording.status,
                    error
                ),
                None => format!(
                    "{} -> {}, {} detections, {:.2} s",
                    recording.file_path.display(),
                    recording.status,
                    recording.detections.len(),
                    recording.duration.unwrap_or(0.0)
                ),
            })
            .collect();
        lines.push(format!(
            "scan -> completed {}, failed {}, detections {}",
            self.queue.completed,
            self.queue.failed,
            self.detection_count()
        ));
        lines
    }
}
