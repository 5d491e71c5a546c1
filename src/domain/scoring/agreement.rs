//! Component agreement and overall confidence.

/// Share of overall confidence taken by agreement; the rest is mean model confidence.
pub const AGREEMENT_SHARE: f64 = 0.4;

/// `1 - population stddev` of component probabilities, clamped to [0, 1].
///
/// Fewer than two components agree trivially.
pub fn component_agreement(probabilities: &[f64]) -> f64 {
    if probabilities.len() < 2 {
        return 1.0;
    }
    let n = probabilities.len() as f64;
    let mean = probabilities.iter().sum::<f64>() / n;
    let variance = probabilities.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    (1.0 - variance.sqrt()).clamp(0.0, 1.0)
}

/// Mean of per-component confidences; 0.0 when there are none.
pub fn mean_confidence(confidences: &[f64]) -> f64 {
    if confidences.is_empty() {
        return 0.0;
    }
    confidences.iter().sum::<f64>() / confidences.len() as f64
}

/// `0.4 * agreement + 0.6 * mean confidence`, clamped to [0, 1].
pub fn overall_confidence(agreement: f64, mean_confidence: f64) -> f64 {
    let confidence = AGREEMENT_SHARE * agreement + (1.0 - AGREEMENT_SHARE) * mean_confidence;
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
