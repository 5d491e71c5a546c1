//! Learned per-pattern mean vectors for statistical matching.
//!
//! A profile vector is the four pillar scores (0-1) followed by the
//! normalized indicators of the pattern's key features.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::features::FeatureVector;
use crate::domain::patterns::{PatternDefinition, PatternLibrary};
use crate::domain::scoring::CategoryScores;

/// A labeled training example.
#[derive(Debug, Clone)]
pub struct LabeledSample {
    pub vector: FeatureVector,
    pub patterns: Vec<String>,
}

/// Mean profile vector per pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalProfiles {
    means: BTreeMap<String, Vec<f64>>,
}

impl StatisticalProfiles {
    /// Builds profiles from precomputed means.
    pub fn from_means(means: BTreeMap<String, Vec<f64>>) -> Self {
        Self { means }
    }

    /// Learns mean vectors from labeled samples.
    ///
    /// Patterns with no labeled sample get no profile. Labels that are not in
    /// the library are ignored.
    pub fn fit(samples: &[LabeledSample], library: &PatternLibrary) -> Self {
        let mut sums: BTreeMap<String, (Vec<f64>, usize)> = BTreeMap::new();
        for sample in samples {
            let scores = CategoryScores::from_vector(&sample.vector);
            for label in &sample.patterns {
                let Some(def) = library.get(label) else {
                    continue;
                };
                let row = profile_vector(def, &scores, &sample.vector);
                let entry = sums
                    .entry(label.clone())
                    .or_insert_with(|| (vec![0.0; row.len()], 0));
                for (acc, v) in entry.0.iter_mut().zip(&row) {
                    *acc += v;
                }
                entry.1 += 1;
            }
        }
        let means = sums
            .into_iter()
            .map(|(name, (sum, n))| (name, sum.into_iter().map(|s| s / n as f64).collect()))
            .collect();
        Self { means }
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn mean(&self, pattern: &str) -> Option<&[f64]> {
        self.means.get(pattern).map(Vec::as_slice)
    }

    /// Cosine similarity rescaled to [0, 1], or `None` without a profile.
    pub fn similarity(
        &self,
        def: &PatternDefinition,
        scores: &CategoryScores,
        vector: &FeatureVector,
    ) -> Option<f64> {
        let mean = self.means.get(&def.name)?;
        let row = profile_vector(def, scores, vector);
        Some((cosine(&row, mean) + 1.0) / 2.0)
    }
}

/// Pillar scores (0-1) followed by key-feature indicators (absent reads 0).
pub fn profile_vector(def: &PatternDefinition, scores: &CategoryScores, vector: &FeatureVector) -> Vec<f64> {
    scores
        .as_array()
        .iter()
        .map(|s| s / 100.0)
        .chain(
            def.key_features
                .iter()
                .map(|f| vector.indicator(f).unwrap_or(0.0)),
        )
        .collect()
}

/// Cosine similarity; 0.0 when either side has zero norm or widths differ.
fn cosine(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a <= f64::EPSILON || norm_b <= f64::EPSILON {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
