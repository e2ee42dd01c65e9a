//! Best-peak selection.

use crate::peaks::{Peak, PeakSet};

/// Highest-scoring peak of a set.
///
/// Peaks are scanned in ascending frequency; a later peak replaces the
/// current pick only with a strictly higher score, so ties go to the lowest
/// frequency. Returns `None` for an empty set.
pub fn best_peak(set: &PeakSet) -> Option<&Peak> {
    let mut ordered: Vec<&Peak> = set.iter().collect();
    ordered.sort_by(|a, b| a.f0.total_cmp(&b.f0));

    let mut best: Option<&Peak> = None;
    for peak in ordered {
        if best.is_none_or(|b| peak.score() > b.score()) {
            best = Some(peak);
        }
    }
    best
}
