//! Explanatory factors drawn from component signals and pillar scores.

use std::collections::BTreeMap;

use crate::domain::features::Pillar;
use crate::domain::foundation::ComponentId;

use super::CategoryScores;

/// Maximum number of key factors in a decision.
pub const MAX_KEY_FACTORS: usize = 5;

/// Pillars below this score are reported as risks.
pub const RISK_PILLAR_SCORE: f64 = 40.0;

/// Pillars at or above this score are reported as strengths.
pub const STRENGTH_PILLAR_SCORE: f64 = 65.0;

/// Up to five factors: the primary pattern first, then the most extreme
/// component signals (furthest from 0.5).
pub fn key_factors(components: &BTreeMap<ComponentId, f64>, primary: Option<(&str, f64)>) -> Vec<String> {
    let mut factors = Vec::with_capacity(MAX_KEY_FACTORS);
    if let Some((pattern, confidence)) = primary {
        factors.push(format!(
            "Primary pattern {} ({:.0}% match)",
            pattern,
            confidence * 100.0
        ));
    }

    let mut ranked: Vec<(ComponentId, f64)> = components.iter().map(|(c, p)| (*c, *p)).collect();
    ranked.sort_by(|a, b| (b.1 - 0.5).abs().total_cmp(&(a.1 - 0.5).abs()));

    for (component, probability) in ranked {
        if factors.len() >= MAX_KEY_FACTORS {
            break;
        }
        factors.push(format!(
            "{} signal {} ({:.1}%)",
            component.display_name(),
            describe_signal(probability),
            probability * 100.0
        ));
    }
    factors
}

fn describe_signal(probability: f64) -> &'static str {
    match probability {
        p if p >= 0.7 => "strongly positive",
        p if p >= 0.55 => "positive",
        p if p > 0.45 => "neutral",
        p if p > 0.3 => "negative",
        _ => "strongly negative",
    }
}

/// Risk and success factors from weak and strong pillars.
pub fn pillar_factors(scores: &CategoryScores) -> (Vec<String>, Vec<String>) {
    let describe = |pillar: Pillar, score: f64, label: &str| {
        format!("{} {} (score {:.0})", label, pillar.display_name(), score)
    };
    let risks = scores
        .below(RISK_PILLAR_SCORE)
        .into_iter()
        .map(|(p, s)| describe(p, s, "Weak"))
        .collect();
    let strengths = scores
        .at_or_above(STRENGTH_PILLAR_SCORE)
        .into_iter()
        .map(|(p, s)| describe(p, s, "Strong"))
        .collect();
    (risks, strengths)
}
