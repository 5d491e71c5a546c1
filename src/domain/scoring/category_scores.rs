//! Composite pillar scores (Capital, Advantage, Market, People).
//!
//! Each score is the mean of the normalized indicators of the features the
//! caller actually supplied for that pillar, on a 0-100 scale. A pillar with
//! no supplied indicators scores a neutral 50.

use serde::{Deserialize, Serialize};

use crate::domain::features::{FeatureVector, Pillar};

/// Neutral score for a pillar with no signal.
pub const NEUTRAL_PILLAR_SCORE: f64 = 50.0;

/// The four composite category scores, each 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub capital: f64,
    pub advantage: f64,
    pub market: f64,
    pub people: f64,
}

impl CategoryScores {
    /// Creates scores directly, clamping each to 0-100.
    pub fn new(capital: f64, advantage: f64, market: f64, people: f64) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 100.0) } else { NEUTRAL_PILLAR_SCORE };
        Self {
            capital: clamp(capital),
            advantage: clamp(advantage),
            market: clamp(market),
            people: clamp(people),
        }
    }

    /// All pillars at the neutral score.
    pub fn neutral() -> Self {
        Self::new(
            NEUTRAL_PILLAR_SCORE,
            NEUTRAL_PILLAR_SCORE,
            NEUTRAL_PILLAR_SCORE,
            NEUTRAL_PILLAR_SCORE,
        )
    }

    /// Computes pillar scores from whatever features are present.
    pub fn from_vector(vector: &FeatureVector) -> Self {
        let score = |pillar: Pillar| {
            let indicators = vector.pillar_indicators(pillar);
            if indicators.is_empty() {
                NEUTRAL_PILLAR_SCORE
            } else {
                indicators.iter().sum::<f64>() / indicators.len() as f64 * 100.0
            }
        };
        Self::new(
            score(Pillar::Capital),
            score(Pillar::Advantage),
            score(Pillar::Market),
            score(Pillar::People),
        )
    }

    /// Returns the score of one pillar.
    pub fn get(&self, pillar: Pillar) -> f64 {
        match pillar {
            Pillar::Capital => self.capital,
            Pillar::Advantage => self.advantage,
            Pillar::Market => self.market,
            Pillar::People => self.people,
        }
    }

    /// Scores in canonical pillar order.
    pub fn as_array(&self) -> [f64; 4] {
        [self.capital, self.advantage, self.market, self.people]
    }

    /// Mean of the four pillars on a 0.0-1.0 scale.
    pub fn mean_fraction(&self) -> f64 {
        self.as_array().iter().sum::<f64>() / 400.0
    }

    /// Pillars scoring strictly below `threshold`, weakest first.
    pub fn below(&self, threshold: f64) -> Vec<(Pillar, f64)> {
        let mut weak: Vec<_> = Pillar::all()
            .iter()
            .map(|p| (*p, self.get(*p)))
            .filter(|(_, s)| *s < threshold)
            .collect();
        weak.sort_by(|a, b| a.1.total_cmp(&b.1));
        weak
    }

    /// Pillars scoring at or above `threshold`, strongest first.
    pub fn at_or_above(&self, threshold: f64) -> Vec<(Pillar, f64)> {
        let mut strong: Vec<_> = Pillar::all()
            .iter()
            .map(|p| (*p, self.get(*p)))
            .filter(|(_, s)| *s >= threshold)
            .collect();
        strong.sort_by(|a, b| b.1.total_cmp(&a.1));
        strong
    }
}

impl Default for CategoryScores {
    fn default() -> Self {
        Self::neutral()
    }
}
