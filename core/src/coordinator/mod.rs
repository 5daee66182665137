//! Per-recording processing lifecycle.
//!
//! A [`Coordinator`] runs at most one analysis at a time. Each run moves its
//! job `Pending -> Processing -> Completed | Failed`, reports progress through
//! a [`Notifier`] and persists detections through a [`RecordingStore`] only
//! when the whole run succeeded. A job that already finished is never run
//! again.

pub mod notify;
pub mod store;

use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::capture::{self, LoadError};
use crate::interface::{Detection, JobStatus, JobUpdate, RecordingId, RecordingUpdate};
use crate::prelude::{AnalysisConfig, AnalysisError};
use crate::processing::AnalysisPipeline;
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};

pub use notify::{ChannelNotifier, EventKind, LogNotifier, Notifier, ProcessingEvent};
pub use store::{MemoryStore, QueueStats, RecordingStore, StoreError};

/// A progress event is emitted after every this many detections.
pub const PROGRESS_INTERVAL: usize = 10;

#[derive(thiserror::Error, Debug)]
pub enum JobError {
    #[error("recording {0} not found")]
    RecordingNotFound(RecordingId),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("analysis worker failed: {0}")]
    Worker(String),
}

struct Analysis {
    detections: Vec<Detection>,
    duration: f64,
    sample_rate: Option<u32>,
}

struct Outcome {
    count: usize,
    rfi_detected: bool,
    duration: f64,
}

struct Shared {
    gate: Mutex<()>,
    store: Arc<dyn RecordingStore>,
    notifier: Arc<dyn Notifier>,
    pipeline: AnalysisPipeline,
    metrics: MetricsRecorder,
}

/// Owns the single-flight gate and the handles to the store and notifier.
/// Cloning shares the same gate.
#[derive(Clone)]
pub struct Coordinator {
    shared: Arc<Shared>,
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn RecordingStore>,
        notifier: Arc<dyn Notifier>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                gate: Mutex::new(()),
                store,
                notifier,
                pipeline: AnalysisPipeline::new(config),
                metrics: MetricsRecorder::new(),
            }),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Spawns the run and returns immediately.
    pub fn process_recording_async(&self, id: RecordingId) -> JoinHandle<JobStatus> {
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.process_recording(id).await })
    }

    /// Runs one recording to a terminal state, waiting for any run in flight.
    /// A job that is already terminal is returned as is, without events.
    pub async fn process_recording(&self, id: RecordingId) -> JobStatus {
        let _gate = self.shared.gate.lock().await;

        match self
            .shared
            .store
            .update_job(id, JobUpdate::processing(Utc::now()))
        {
            Ok(()) => {}
            Err(StoreError::JobFinished(_, status)) => {
                info!("recording {} already {}, skipping", id, status);
                return status;
            }
            Err(err) => warn!("could not mark recording {} processing: {}", id, err),
        }
        info!("processing recording {}", id);
        self.emit(id, EventKind::Started);

        match self.run(id).await {
            Ok(outcome) => {
                self.transition(id, JobUpdate::completed(Utc::now()));
                self.shared.metrics.record_completed(outcome.count);
                info!(
                    "recording {} completed: {} detections over {:.2} s",
                    id, outcome.count, outcome.duration
                );
                self.emit(
                    id,
                    EventKind::Completed {
                        count: outcome.count,
                        rfi_detected: outcome.rfi_detected,
                        duration: outcome.duration,
                    },
                );
                JobStatus::Completed
            }
            Err(err) => {
                let message = err.to_string();
                error!("recording {} failed: {}", id, message);
                self.transition(id, JobUpdate::failed(Utc::now(), message.clone()));
                self.shared.metrics.record_failed();
                self.emit(id, EventKind::Failed { error: message });
                JobStatus::Failed
            }
        }
    }

    async fn run(&self, id: RecordingId) -> Result<Outcome, JobError> {
        let mut meta = self
            .shared
            .store
            .get_recording(id)?
            .ok_or(JobError::RecordingNotFound(id))?;

        let pipeline = self.shared.pipeline.clone();
        let analysis = tokio::task::spawn_blocking(move || -> Result<Analysis, JobError> {
            let path = meta.file_path.clone();
            let buffer = capture::load(&path, &mut meta)?;
            let detections = pipeline.analyze(&buffer)?;
            Ok(Analysis {
                detections,
                duration: buffer.duration_secs(),
                sample_rate: meta.sample_rate,
            })
        })
        .await
        .map_err(|err| JobError::Worker(err.to_string()))??;

        for (idx, detection) in analysis.detections.iter().enumerate() {
            let count = idx + 1;
            if count % PROGRESS_INTERVAL == 0 {
                self.emit(
                    id,
                    EventKind::Progress {
                        count,
                        latest: *detection,
                    },
                );
            }
        }

        let count = analysis.detections.len();
        let rfi_detected = count > 0;
        self.shared.store.commit_run(
            id,
            analysis.detections,
            RecordingUpdate {
                processed: true,
                rfi_detected,
                duration: Some(analysis.duration),
                sample_rate: analysis.sample_rate,
                completed_at: Utc::now(),
            },
        )?;

        Ok(Outcome {
            count,
            rfi_detected,
            duration: analysis.duration,
        })
    }

    fn transition(&self, id: RecordingId, update: JobUpdate) {
        let status = update.status;
        if let Err(err) = self.shared.store.update_job(id, update) {
            warn!("could not mark recording {} {}: {}", id, status, err);
        }
    }

    fn emit(&self, id: RecordingId, kind: EventKind) {
        self.shared.notifier.emit(ProcessingEvent::now(id, kind));
    }
}
