use serde::{Deserialize, Serialize};

use crate::interface::InterferenceKind;

/// The two heuristic tables, one per detection path. First match wins in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classifier {
    /// Frequency bands, then power. Bandwidth is ignored.
    Fast,
    /// Bandwidth, then power, then frequency bands.
    Detailed,
}

impl Classifier {
    pub fn classify(self, frequency_hz: f64, power_db: f64, bandwidth_hz: f64) -> InterferenceKind {
        match self {
            Classifier::Fast => classify_fast(frequency_hz, power_db),
            Classifier::Detailed => classify_detailed(frequency_hz, power_db, bandwidth_hz),
        }
    }
}

pub fn classify_fast(frequency_hz: f64, power_db: f64) -> InterferenceKind {
    let mhz = frequency_hz / 1e6;
    if (88.0..=108.0).contains(&mhz) {
        InterferenceKind::FmBroadcast
    } else if (174.0..=216.0).contains(&mhz) {
        InterferenceKind::TvBroadcast
    } else if (470.0..=790.0).contains(&mhz) {
        InterferenceKind::UhfTv
    } else if (2400.0..=2500.0).contains(&mhz) {
        InterferenceKind::WifiIsm
    } else if power_db > -20.0 {
        InterferenceKind::StrongLocal
    } else if power_db > -40.0 {
        InterferenceKind::Moderate
    } else {
        InterferenceKind::WeakSignal
    }
}

pub fn classify_detailed(frequency_hz: f64, power_db: f64, bandwidth_hz: f64) -> InterferenceKind {
    if bandwidth_hz > 100e3 {
        InterferenceKind::Broadband
    } else if bandwidth_hz < 1e3 {
        InterferenceKind::Narrowband
    } else if power_db > -40.0 {
        InterferenceKind::StrongInterference
    } else if (88e6..=108e6).contains(&frequency_hz) {
        InterferenceKind::FmRadio
    } else if (535e3..=1705e3).contains(&frequency_hz) {
        InterferenceKind::AmBroadcast
    } else if frequency_hz > 2.4e9 && frequency_hz < 2.5e9 {
        // open interval, unlike the fast table
        InterferenceKind::Wifi
    } else {
        InterferenceKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_table_prefers_bands_over_power() {
        for power in [-90.0, -30.0, 10.0] {
            assert_eq!(classify_fast(100e6, power), InterferenceKind::FmBroadcast);
        }
        assert_eq!(classify_fast(88e6, -90.0), InterferenceKind::FmBroadcast);
        assert_eq!(classify_fast(108e6, -90.0), InterferenceKind::FmBroadcast);
        assert_eq!(classify_fast(200e6, 0.0), InterferenceKind::TvBroadcast);
        assert_eq!(classify_fast(600e6, 0.0), InterferenceKind::UhfTv);
        assert_eq!(classify_fast(2.45e9, 0.0), InterferenceKind::WifiIsm);
        assert_eq!(classify_fast(2.4e9, 0.0), InterferenceKind::WifiIsm);
    }

    #[test]
    fn fast_table_falls_back_to_power_bands() {
        assert_eq!(classify_fast(5_000.0, 50.0), InterferenceKind::StrongLocal);
        assert_eq!(classify_fast(5_000.0, -20.0), InterferenceKind::Moderate);
        assert_eq!(classify_fast(5_000.0, -39.9), InterferenceKind::Moderate);
        assert_eq!(classify_fast(5_000.0, -40.0), InterferenceKind::WeakSignal);
    }

    #[test]
    fn detailed_table_checks_bandwidth_first() {
        assert_eq!(
            classify_detailed(100e6, -60.0, 200e3),
            InterferenceKind::Broadband
        );
        assert_eq!(
            classify_detailed(100e6, -60.0, 500.0),
            InterferenceKind::Narrowband
        );
        assert_eq!(
            classify_detailed(100e6, -10.0, 5e3),
            InterferenceKind::StrongInterference
        );
        assert_eq!(
            classify_detailed(100e6, -60.0, 5e3),
            InterferenceKind::FmRadio
        );
        assert_eq!(
            classify_detailed(1e6, -60.0, 5e3),
            InterferenceKind::AmBroadcast
        );
        assert_eq!(
            classify_detailed(50e3, -60.0, 5e3),
            InterferenceKind::Unknown
        );
    }

    #[test]
    fn detailed_wifi_band_excludes_its_edges() {
        assert_eq!(classify_detailed(2.45e9, -60.0, 5e3), InterferenceKind::Wifi);
        assert_eq!(
            classify_detailed(2.4e9, -60.0, 5e3),
            InterferenceKind::Unknown
        );
        assert_eq!(
            classify_detailed(2.5e9, -60.0, 5e3),
            InterferenceKind::Unknown
        );
    }

    #[test]
    fn classifier_dispatches_to_its_table() {
        assert_eq!(
            Classifier::Fast.classify(5_000.0, -30.0, 1.0),
            InterferenceKind::Moderate
        );
        assert_eq!(
            Classifier::Detailed.classify(5_000.0, -30.0, 1.0),
            InterferenceKind::Narrowband
        );
    }
}
