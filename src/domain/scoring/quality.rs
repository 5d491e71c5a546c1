//! Model-free quality score and its blend with the ensemble output.

use serde::{Deserialize, Serialize};

use crate::domain::features::FeatureVector;

/// A quality indicator: feature, and how its raw value maps to 0-1.
struct Indicator {
    feature: &'static str,
    map: fn(f64) -> f64,
}

fn log_scale(value: f64, max_exp: f64) -> f64 {
    if value <= 1.0 {
        0.0
    } else {
        value.log10() / max_exp
    }
}

const BASKET: &[Indicator] = &[
    Indicator { feature: "annual_revenue_run_rate", map: |v| log_scale(v, 7.0) },
    Indicator { feature: "revenue_growth_rate_percent", map: |v| v / 200.0 },
    Indicator { feature: "burn_multiple", map: |v| (4.0 - v) / 3.5 },
    Indicator { feature: "runway_months", map: |v| v / 24.0 },
    Indicator { feature: "team_size", map: |v| log_scale(v, 2.0) },
    Indicator { feature: "years_experience_avg", map: |v| v / 15.0 },
    Indicator { feature: "net_dollar_retention_percent", map: |v| (v - 70.0) / 80.0 },
    Indicator { feature: "tam_size_usd", map: |v| log_scale(v, 11.0) },
];

/// Bonus per funding stage, aligned with the stage vocabulary.
const STAGE_BONUS: &[f64] = &[0.2, 0.35, 0.5, 0.65, 0.8, 0.9];

/// Quality-score and blend constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityBlend {
    /// Score used when no indicator carries signal.
    pub no_signal_score: f64,
    /// Raw scores below this lean hardest on quality.
    pub low_cutoff: f64,
    pub low_quality_share: f64,
    /// Raw scores below this (and at or above `low_cutoff`) split evenly.
    pub mid_cutoff: f64,
    pub mid_quality_share: f64,
    pub high_quality_share: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for QualityBlend {
    fn default() -> Self {
        Self {
            no_signal_score: 0.3,
            low_cutoff: 0.3,
            low_quality_share: 0.6,
            mid_cutoff: 0.5,
            mid_quality_share: 0.5,
            high_quality_share: 0.3,
            floor: 0.05,
            ceiling: 0.95,
        }
    }
}

impl QualityBlend {
    /// Mean of the basket indicators that carry signal.
    ///
    /// An indicator counts only if its feature was supplied with a positive
    /// raw value; the funding stage counts whenever supplied.
    pub fn quality_score(&self, vector: &FeatureVector) -> f64 {
        let mut signals: Vec<f64> = BASKET
            .iter()
            .filter(|ind| vector.is_present(ind.feature))
            .filter_map(|ind| {
                let raw = vector.numeric(ind.feature);
                (raw > 0.0).then(|| (ind.map)(raw).clamp(0.0, 1.0))
            })
            .collect();

        if vector.is_present("funding_stage") {
            let stage = vector.numeric("funding_stage").max(0.0) as usize;
            if let Some(bonus) = STAGE_BONUS.get(stage) {
                signals.push(*bonus);
            }
        }

        if signals.is_empty() {
            self.no_signal_score
        } else {
            signals.iter().sum::<f64>() / signals.len() as f64
        }
    }

    /// Share of the blend taken by the quality score for a given raw score.
    pub fn quality_share(&self, raw: f64) -> f64 {
        if raw < self.low_cutoff {
            self.low_quality_share
        } else if raw < self.mid_cutoff {
            self.mid_quality_share
        } else {
            self.high_quality_share
        }
    }

    /// Blends raw and quality scores and clamps to `[floor, ceiling]`.
    pub fn blend(&self, raw: f64, quality: f64) -> f64 {
        let raw = if raw.is_finite() { raw } else { 0.5 };
        let share = self.quality_share(raw);
        let blended = share * quality + (1.0 - share) * raw;
        self.clamp(blended)
    }

    pub fn clamp(&self, probability: f64) -> f64 {
        if probability.is_finite() {
            probability.clamp(self.floor, self.ceiling)
        } else {
            0.5
        }
    }
}
