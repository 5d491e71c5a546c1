//! Adaptive component weighting.
//!
//! Static base weights are scaled by each active component's confidence and
//! renormalized. Inactive components take no weight, so their share is
//! redistributed proportionally across the rest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::ComponentId;

/// Base weight per component: the static table with overrides merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    weights: BTreeMap<ComponentId, f64>,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            weights: ComponentId::all()
                .iter()
                .map(|c| (*c, c.default_weight()))
                .collect(),
        }
    }
}

impl WeightTable {
    /// Static table with `overrides` replacing individual entries.
    /// Negative or non-finite overrides are ignored.
    pub fn with_overrides(overrides: &BTreeMap<ComponentId, f64>) -> Self {
        let mut table = Self::default();
        for (component, weight) in overrides {
            if weight.is_finite() && *weight >= 0.0 {
                table.weights.insert(*component, *weight);
            }
        }
        table
    }

    pub fn base(&self, component: ComponentId) -> f64 {
        self.weights.get(&component).copied().unwrap_or(0.0)
    }

    /// Normalized weights for the active components.
    ///
    /// `active` pairs each contributing component with its confidence, if it
    /// reported one; `default_confidence` stands in otherwise. If every
    /// adjusted weight is zero the base weights are used, and if those are
    /// zero too the active components share equally. The result sums to 1
    /// whenever `active` is non-empty.
    pub fn normalize(
        &self,
        active: &[(ComponentId, Option<f64>)],
        default_confidence: f64,
    ) -> BTreeMap<ComponentId, f64> {
        if active.is_empty() {
            return BTreeMap::new();
        }

        let adjusted: Vec<(ComponentId, f64)> = active
            .iter()
            .map(|(c, confidence)| {
                let confidence = confidence.unwrap_or(default_confidence).clamp(0.0, 1.0);
                (*c, self.base(*c) * confidence)
            })
            .collect();

        if let Some(weights) = normalized(&adjusted) {
            return weights;
        }
        let base: Vec<_> = active.iter().map(|(c, _)| (*c, self.base(*c))).collect();
        if let Some(weights) = normalized(&base) {
            return weights;
        }
        let share = 1.0 / active.len() as f64;
        active.iter().map(|(c, _)| (*c, share)).collect()
    }
}

fn normalized(weights: &[(ComponentId, f64)]) -> Option<BTreeMap<ComponentId, f64>> {
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if !(total.is_finite() && total > 0.0) {
        return None;
    }
    Some(weights.iter().map(|(c, w)| (*c, w / total)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(weights: &BTreeMap<ComponentId, f64>) -> f64 {
        weights.values().sum()
    }

    #[test]
    fn all_active_at_equal_confidence_keeps_static_ratios() {
        let table = WeightTable::default();
        let active: Vec<_> = ComponentId::all().iter().map(|c| (*c, Some(0.8))).collect();
        let weights = table.normalize(&active, 0.7);
        assert!((sum(&weights) - 1.0).abs() < 1e-12);
        assert!((weights[&ComponentId::Ensemble] - 0.40).abs() < 1e-12);
        assert!((weights[&ComponentId::Pattern] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn missing_pattern_is_redistributed_proportionally() {
        let table = WeightTable::default();
        let active = vec![
            (ComponentId::Ensemble, None),
            (ComponentId::Temporal, None),
            (ComponentId::Industry, None),
        ];
        let weights = table.normalize(&active, 0.7);
        assert!((sum(&weights) - 1.0).abs() < 1e-12);
        assert!((weights[&ComponentId::Ensemble] - 0.40 / 0.75).abs() < 1e-12);
        assert!(!weights.contains_key(&ComponentId::Pattern));
    }

    #[test]
    fn confidence_scales_weight() {
        let table = WeightTable::default();
        let active = vec![(ComponentId::Ensemble, Some(0.5)), (ComponentId::Temporal, Some(1.0))];
        let weights = table.normalize(&active, 0.7);
        assert!((weights[&ComponentId::Ensemble] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_confidence_everywhere_falls_back_to_base() {
        let table = WeightTable::default();
        let active = vec![(ComponentId::Ensemble, Some(0.0)), (ComponentId::Industry, Some(0.0))];
        let weights = table.normalize(&active, 0.7);
        assert!((weights[&ComponentId::Ensemble] - 0.40 / 0.55).abs() < 1e-12);
    }

    #[test]
    fn zero_base_weights_share_equally() {
        let mut overrides = BTreeMap::new();
        overrides.insert(ComponentId::Ensemble, 0.0);
        overrides.insert(ComponentId::Temporal, 0.0);
        let table = WeightTable::with_overrides(&overrides);
        let active = vec![(ComponentId::Ensemble, None), (ComponentId::Temporal, None)];
        let weights = table.normalize(&active, 0.7);
        assert_eq!(weights[&ComponentId::Ensemble], 0.5);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut overrides = BTreeMap::new();
        overrides.insert(ComponentId::Industry, -1.0);
        overrides.insert(ComponentId::Temporal, f64::NAN);
        let table = WeightTable::with_overrides(&overrides);
        assert_eq!(table, WeightTable::default());
    }

    #[test]
    fn nothing_active_means_no_weights() {
        assert!(WeightTable::default().normalize(&[], 0.7).is_empty());
    }
}
