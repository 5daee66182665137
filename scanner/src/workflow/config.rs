use anyhow::Context;
use rficore::prelude::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one scan, loaded from YAML or assembled from CLI flags.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Sample rate for raw IQ captures; WAV files carry their own.
    pub sample_rate: Option<u32>,
    pub center_frequency: Option<f64>,
    pub analysis: AnalysisConfig,
    /// JSON report destination.
    pub report: Option<PathBuf>,
}

impl ScanConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading scan config {}", path_ref.display()))?;
        let config: ScanConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing scan config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        sample_rate: Option<u32>,
        center_frequency: Option<f64>,
        report: Option<PathBuf>,
    ) -> Self {
        Self {
            sample_rate,
            center_frequency,
            report,
            ..Self::default()
        }
    }

    /// Flags given on the command line win over the file.
    pub fn with_overrides(mut self, overrides: ScanConfig) -> Self {
        if overrides.sample_rate.is_some() {
            self.sample_rate = overrides.sample_rate;
        }
        if overrides.center_frequency.is_some() {
            self.center_frequency = overrides.center_frequency;
        }
        if overrides.report.is_some() {
            self.report = overrides.report;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_default_analysis() {
        let cfg = ScanConfig::from_args(Some(1_000_000), None, None);
        assert_eq!(cfg.sample_rate, Some(1_000_000));
        assert_eq!(cfg.analysis, AnalysisConfig::default());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"sample_rate: 1024000\ncenter_frequency: 98000000.0\nanalysis:\n  complex:\n    max_candidates: 50\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ScanConfig::load(&path).unwrap();
        assert_eq!(cfg.sample_rate, Some(1_024_000));
        assert_eq!(cfg.center_frequency, Some(98e6));
        assert_eq!(cfg.analysis.complex.max_candidates, 50);
        assert_eq!(cfg.analysis.complex.window, 4096);
        assert!(cfg.report.is_none());
    }

    #[test]
    fn flags_override_file_values() {
        let file = ScanConfig::from_args(Some(1_000), Some(1.0), None);
        let merged = file.with_overrides(ScanConfig::from_args(
            None,
            Some(2.0),
            Some(PathBuf::from("out.json")),
        ));
        assert_eq!(merged.sample_rate, Some(1_000));
        assert_eq!(merged.center_frequency, Some(2.0));
        assert_eq!(merged.report, Some(PathBuf::from("out.json")));
    }
}
