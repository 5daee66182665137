use crate::report::{RecordingReport, ScanReport};
use crate::workflow::config::ScanConfig;
use anyhow::Context;
use log::info;
use rficore::coordinator::{ChannelNotifier, Coordinator, MemoryStore};
use rficore::interface::JobStatus;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct Runner {
    config: ScanConfig,
}

impl Runner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Queues every capture at once and lets the coordinator work through them.
    pub async fn execute(&self, paths: &[PathBuf]) -> anyhow::Result<ScanReport> {
        let store = Arc::new(MemoryStore::new());
        let (notifier, mut receiver) = ChannelNotifier::new();
        let coordinator = Coordinator::new(
            store.clone(),
            Arc::new(notifier),
            self.config.analysis.clone(),
        );

        let mut ids = Vec::with_capacity(paths.len());
        for path in paths {
            let id = store
                .register(
                    path.clone(),
                    self.config.sample_rate,
                    self.config.center_frequency,
                )
                .with_context(|| format!("registering {}", path.display()))?;
            ids.push(id);
        }
        info!("queued {} captures", ids.len());

        let handles: Vec<_> = ids
            .iter()
            .map(|&id| coordinator.process_recording_async(id))
            .collect();
        for handle in handles {
            handle.await.context("joining processing task")?;
        }

        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }

        let mut recordings = Vec::with_capacity(ids.len());
        for id in ids {
            let recording = store
                .recording(id)
                .with_context(|| format!("recording {} vanished from the store", id))?;
            let job = store.job(id);
            recordings.push(RecordingReport {
                id,
                file_path: recording.file_path,
                status: job.as_ref().map(|j| j.status).unwrap_or(JobStatus::Pending),
                error: job.and_then(|j| j.error),
                duration: recording.duration,
                sample_rate: recording.sample_rate,
                rfi_detected: recording.rfi_detected,
                detections: store.detections(id),
            });
        }

        Ok(ScanReport {
            recordings,
            events,
            queue: store.queue_stats().context("reading queue statistics")?,
            metrics: coordinator.metrics(),
        })
    }
}
