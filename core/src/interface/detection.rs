use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse interference label produced by one of the two classification tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InterferenceKind {
    /// FM band hit from the fast table.
    #[serde(rename = "FM_broadcast")]
    FmBroadcast,
    #[serde(rename = "TV_broadcast")]
    TvBroadcast,
    #[serde(rename = "UHF_TV")]
    UhfTv,
    #[serde(rename = "WiFi_ISM")]
    WifiIsm,
    #[serde(rename = "strong_local")]
    StrongLocal,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "weak_signal")]
    WeakSignal,
    #[serde(rename = "broadband")]
    Broadband,
    #[serde(rename = "narrowband")]
    Narrowband,
    #[serde(rename = "strong_interference")]
    StrongInterference,
    /// FM band hit from the detailed table, stored in lower case.
    #[serde(rename = "fm_broadcast")]
    FmRadio,
    #[serde(rename = "am_broadcast")]
    AmBroadcast,
    #[serde(rename = "wifi")]
    Wifi,
    #[serde(rename = "unknown")]
    Unknown,
}

impl InterferenceKind {
    /// Storage label, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            InterferenceKind::FmBroadcast => "FM_broadcast",
            InterferenceKind::TvBroadcast => "TV_broadcast",
            InterferenceKind::UhfTv => "UHF_TV",
            InterferenceKind::WifiIsm => "WiFi_ISM",
            InterferenceKind::StrongLocal => "strong_local",
            InterferenceKind::Moderate => "moderate",
            InterferenceKind::WeakSignal => "weak_signal",
            InterferenceKind::Broadband => "broadband",
            InterferenceKind::Narrowband => "narrowband",
            InterferenceKind::StrongInterference => "strong_interference",
            InterferenceKind::FmRadio => "fm_broadcast",
            InterferenceKind::AmBroadcast => "am_broadcast",
            InterferenceKind::Wifi => "wifi",
            InterferenceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for InterferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate emitted by the peak detector before classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub timestamp: f64,
    pub frequency: f64,
    pub power_level: f64,
    pub bandwidth: f64,
    pub confidence: f64,
}

/// One flagged interference event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Seconds from the start of the recording.
    pub timestamp: f64,
    /// Hz.
    pub frequency: f64,
    /// dB.
    pub power_level: f64,
    /// Hz.
    pub bandwidth: f64,
    pub confidence: f64,
    #[serde(rename = "interference_type")]
    pub category: InterferenceKind,
}

impl Detection {
    pub fn new(peak: Peak, category: InterferenceKind) -> Self {
        Self {
            timestamp: peak.timestamp,
            frequency: peak.frequency,
            power_level: peak.power_level,
            bandwidth: peak.bandwidth,
            confidence: peak.confidence,
            category,
        }
    }
}
