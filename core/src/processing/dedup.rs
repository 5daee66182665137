use crate::interface::Detection;
use crate::prelude::DedupParams;

/// Strongest-first suppression of detections that sit close in both time and
/// frequency to one already kept.
///
/// Ties in power keep their incoming order. With `max_output` set, acceptance
/// stops as soon as that many detections are kept.
pub fn dedupe(mut detections: Vec<Detection>, params: &DedupParams) -> Vec<Detection> {
    // stable sort: equal powers stay in scan order
    detections.sort_by(|a, b| b.power_level.total_cmp(&a.power_level));

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in detections {
        if params.max_output.map_or(false, |cap| kept.len() >= cap) {
            break;
        }
        let crowded = kept
            .iter()
            .any(|existing| is_near(existing, &candidate, params));
        if !crowded {
            kept.push(candidate);
        }
    }
    kept
}

fn is_near(a: &Detection, b: &Detection, params: &DedupParams) -> bool {
    (a.timestamp - b.timestamp).abs() < params.time_threshold
        && (a.frequency - b.frequency).abs() < params.freq_threshold
}
