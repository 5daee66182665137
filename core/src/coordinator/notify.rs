use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::interface::{Detection, RecordingId};

/// Lifecycle event for one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingEvent {
    pub recording_id: RecordingId,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl ProcessingEvent {
    pub fn now(recording_id: RecordingId, kind: EventKind) -> Self {
        Self {
            recording_id,
            timestamp: Utc::now(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    #[serde(rename = "processing_started")]
    Started,
    #[serde(rename = "detection_progress")]
    Progress { count: usize, latest: Detection },
    #[serde(rename = "processing_completed")]
    Completed {
        count: usize,
        rfi_detected: bool,
        duration: f64,
    },
    #[serde(rename = "processing_failed")]
    Failed { error: String },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Started => "processing_started",
            EventKind::Progress { .. } => "detection_progress",
            EventKind::Completed { .. } => "processing_completed",
            EventKind::Failed { .. } => "processing_failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EventKind::Completed { .. } | EventKind::Failed { .. })
    }
}

/// Push-notification collaborator. Emitting never blocks and never fails.
pub trait Notifier: Send + Sync {
    fn emit(&self, event: ProcessingEvent);
}

/// Writes each event as one JSON line through `log`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn emit(&self, event: ProcessingEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => info!("{}", line),
            Err(err) => warn!(
                "dropping {} event for recording {}: {}",
                event.kind.name(),
                event.recording_id,
                err
            ),
        }
    }
}

/// Forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: UnboundedSender<ProcessingEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, UnboundedReceiver<ProcessingEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn emit(&self, event: ProcessingEvent) {
        // a dropped receiver only means nobody is listening
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{InterferenceKind, Peak};

    #[test]
    fn events_serialize_with_wire_names() {
        let event = ProcessingEvent::now(
            3,
            EventKind::Completed {
                count: 4,
                rfi_detected: true,
                duration: 2.5,
            },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "processing_completed");
        assert_eq!(value["recording_id"], 3);
        assert_eq!(value["count"], 4);

        let back: ProcessingEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn progress_carries_latest_detection() {
        let latest = Detection::new(
            Peak {
                timestamp: 1.0,
                frequency: 5_000.0,
                power_level: 50.0,
                bandwidth: 23.4,
                confidence: 1.0,
            },
            InterferenceKind::StrongLocal,
        );
        let event = ProcessingEvent::now(1, EventKind::Progress { count: 10, latest });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "detection_progress");
        assert_eq!(value["latest"]["interference_type"], "strong_local");
        assert!(!event.kind.is_terminal());
    }

    #[test]
    fn channel_notifier_ignores_closed_receiver() {
        let (notifier, mut receiver) = ChannelNotifier::new();
        notifier.emit(ProcessingEvent::now(1, EventKind::Started));
        assert_eq!(
            receiver.try_recv().map(|e| e.kind),
            Ok(EventKind::Started)
        );

        drop(receiver);
        notifier.emit(ProcessingEvent::now(1, EventKind::Started));
    }
}
