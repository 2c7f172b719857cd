//! Best-candidate selection.

use crate::domain::CommuteEstimate;

/// Pick the candidate with the smallest total duration.
///
/// Candidates are walked in order and only a strictly shorter total
/// replaces the current best, so ties go to the candidate seen first.
/// Returns `None` for an empty input.
pub fn select_best(candidates: Vec<CommuteEstimate>) -> Option<CommuteEstimate> {
    let mut best: Option<CommuteEstimate> = None;

    for candidate in candidates {
        let replace = match &best {
            None => true,
            Some(current) => candidate.total_secs() < current.total_secs(),
        };
        if replace {
            best = Some(candidate);
        }
    }

    best
}
