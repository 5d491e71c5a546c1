//! Decision-threshold selection from a precision-recall scan.

/// Threshold used when no candidate reaches the precision floor.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Minimum precision a tuned threshold must achieve.
pub const MIN_PRECISION: f64 = 0.70;

/// Picks the threshold with the highest recall whose precision is at least
/// `min_precision`.
///
/// Every distinct score is a candidate threshold (predict positive when
/// `score >= threshold`). Among equal recalls the higher threshold wins.
/// Returns [`DEFAULT_THRESHOLD`] if no candidate qualifies, if there are no
/// positive labels, or if the inputs are mismatched.
pub fn select_threshold(scores: &[f64], labels: &[bool], min_precision: f64) -> f64 {
    if scores.len() != labels.len() || scores.is_empty() {
        return DEFAULT_THRESHOLD;
    }
    let positives = labels.iter().filter(|l| **l).count();
    if positives == 0 {
        return DEFAULT_THRESHOLD;
    }

    let mut candidates: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
    candidates.sort_by(|a, b| b.total_cmp(a));
    candidates.dedup();

    let mut best: Option<(f64, f64)> = None;
    for threshold in candidates {
        let mut true_positives = 0usize;
        let mut predicted = 0usize;
        for (score, label) in scores.iter().zip(labels) {
            if *score >= threshold {
                predicted += 1;
                if *label {
                    true_positives += 1;
                }
            }
        }
        if predicted == 0 {
            continue;
        }
        let precision = true_positives as f64 / predicted as f64;
        let recall = true_positives as f64 / positives as f64;
        if precision >= min_precision && best.map_or(true, |(_, r)| recall > r) {
            best = Some((threshold, recall));
        }
    }

    best.map(|(t, _)| t).unwrap_or(DEFAULT_THRESHOLD)
}
