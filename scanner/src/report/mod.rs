pub mod model;

use anyhow::Context;
use std::fs;
use std::path::Path;

pub use model::{RecordingReport, ScanReport};

/// Writes `report` as pretty JSON, creating parent directories.
pub fn write_report(report: &ScanReport, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(report).context("serializing scan report")?;
    fs::write(path, json).with_context(|| format!("writing scan report {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rficore::coordinator::QueueStats;
    use rficore::interface::JobStatus;
    use rficore::telemetry::MetricsSnapshot;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn failed_report() -> ScanReport {
        ScanReport {
            recordings: vec![RecordingReport {
                id: 1,
                file_path: PathBuf::from("missing.wav"),
                status: JobStatus::Failed,
                error: Some("unreadable".into()),
                duration: None,
                sample_rate: None,
                rfi_detected: false,
                detections: Vec::new(),
            }],
            events: Vec::new(),
            queue: QueueStats {
                recordings: 1,
                failed: 1,
                ..QueueStats::default()
            },
            metrics: MetricsSnapshot::default(),
        }
    }

    #[test]
    fn report_is_written_as_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports").join("scan.json");
        write_report(&failed_report(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["recordings"][0]["status"], "failed");
        assert_eq!(value["queue"]["failed"], 1);
    }

    #[test]
    fn summary_mentions_failures() {
        let lines = failed_report().summary_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("failed (unreadable)"));
        assert!(lines[1].contains("detections 0"));
    }
}
