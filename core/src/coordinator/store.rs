use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::interface::{
    Detection, JobStatus, JobUpdate, ProcessingJob, Recording, RecordingId, RecordingMeta,
    RecordingUpdate,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("recording {0} not found")]
    RecordingNotFound(RecordingId),
    #[error("no processing job for recording {0}")]
    JobNotFound(RecordingId),
    #[error("job for recording {0} already {1}")]
    JobFinished(RecordingId, JobStatus),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Persistence collaborator driven by the coordinator.
pub trait RecordingStore: Send + Sync {
    fn get_recording(&self, id: RecordingId) -> Result<Option<RecordingMeta>, StoreError>;
    /// Called once per successful run with every detection of that run.
    fn save_detections(&self, id: RecordingId, detections: Vec<Detection>)
        -> Result<(), StoreError>;
    fn update_recording(&self, id: RecordingId, update: RecordingUpdate) -> Result<(), StoreError>;
    /// Persists a finished run: the detections and the recording update
    /// land together or not at all.
    fn commit_run(
        &self,
        id: RecordingId,
        detections: Vec<Detection>,
        update: RecordingUpdate,
    ) -> Result<(), StoreError>;
    /// Fails with [`StoreError::JobFinished`] once the job is terminal.
    fn update_job(&self, id: RecordingId, update: JobUpdate) -> Result<(), StoreError>;
}

/// Queue totals, as broadcast by the live statistics feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub recordings: usize,
    pub processed: usize,
    pub with_rfi: usize,
    pub detections: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Default)]
struct StoreState {
    next_id: RecordingId,
    recordings: BTreeMap<RecordingId, Recording>,
    jobs: BTreeMap<RecordingId, ProcessingJob>,
    detections: BTreeMap<RecordingId, Vec<Detection>>,
    save_calls: usize,
}

impl StoreState {
    fn recording_mut(&mut self, id: RecordingId) -> Result<&mut Recording, StoreError> {
        self.recordings
            .get_mut(&id)
            .ok_or(StoreError::RecordingNotFound(id))
    }

    fn save(&mut self, id: RecordingId, detections: Vec<Detection>) {
        self.save_calls += 1;
        self.detections.entry(id).or_default().extend(detections);
    }
}

fn apply_update(recording: &mut Recording, update: RecordingUpdate) {
    recording.processed = update.processed;
    recording.rfi_detected = update.rfi_detected;
    recording.processing_completed_at = Some(update.completed_at);
    if update.duration.is_some() {
        recording.duration = update.duration;
    }
    if update.sample_rate.is_some() {
        recording.sample_rate = update.sample_rate;
    }
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, StoreError> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }

    /// Adds a recording and queues a pending job for it.
    pub fn register(
        &self,
        file_path: impl Into<PathBuf>,
        sample_rate: Option<u32>,
        center_frequency: Option<f64>,
    ) -> Result<RecordingId, StoreError> {
        let mut state = self.write()?;
        state.next_id += 1;
        let id = state.next_id;
        state.recordings.insert(
            id,
            Recording {
                id,
                file_path: file_path.into(),
                sample_rate,
                center_frequency,
                processed: false,
                rfi_detected: false,
                duration: None,
                processing_completed_at: None,
            },
        );
        state.jobs.insert(id, ProcessingJob::pending(id));
        Ok(id)
    }

    /// Queues a pending job without a recording row, e.g. for an entry whose
    /// recording was deleted after it was enqueued.
    pub fn enqueue(&self, id: RecordingId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.jobs.insert(id, ProcessingJob::pending(id));
        Ok(())
    }

    pub fn recording(&self, id: RecordingId) -> Option<Recording> {
        self.read().ok()?.recordings.get(&id).cloned()
    }

    pub fn job(&self, id: RecordingId) -> Option<ProcessingJob> {
        self.read().ok()?.jobs.get(&id).cloned()
    }

    pub fn detections(&self, id: RecordingId) -> Vec<Detection> {
        self.read()
            .ok()
            .and_then(|state| state.detections.get(&id).cloned())
            .unwrap_or_default()
    }

    pub fn save_calls(&self) -> usize {
        self.read().map(|state| state.save_calls).unwrap_or(0)
    }

    pub fn queue_stats(&self) -> Result<QueueStats, StoreError> {
        let state = self.read()?;
        let mut stats = QueueStats {
            recordings: state.recordings.len(),
            processed: state.recordings.values().filter(|r| r.processed).count(),
            with_rfi: state.recordings.values().filter(|r| r.rfi_detected).count(),
            detections: state.detections.values().map(Vec::len).sum(),
            ..QueueStats::default()
        };
        for job in state.jobs.values() {
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
            }
        }
        Ok(stats)
    }
}

impl RecordingStore for MemoryStore {
    fn get_recording(&self, id: RecordingId) -> Result<Option<RecordingMeta>, StoreError> {
        Ok(self.read()?.recordings.get(&id).map(Recording::meta))
    }

    fn save_detections(
        &self,
        id: RecordingId,
        detections: Vec<Detection>,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.recording_mut(id)?;
        state.save(id, detections);
        Ok(())
    }

    fn update_recording(&self, id: RecordingId, update: RecordingUpdate) -> Result<(), StoreError> {
        let mut state = self.write()?;
        apply_update(state.recording_mut(id)?, update);
        Ok(())
    }

    fn commit_run(
        &self,
        id: RecordingId,
        detections: Vec<Detection>,
        update: RecordingUpdate,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        apply_update(state.recording_mut(id)?, update);
        state.save(id, detections);
        Ok(())
    }

    fn update_job(&self, id: RecordingId, update: JobUpdate) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let job = state.jobs.get_mut(&id).ok_or(StoreError::JobNotFound(id))?;
        if job.apply(update) {
            Ok(())
        } else {
            Err(StoreError::JobFinished(id, job.status))
        }
    }
}
