//! Multi-label tags: independent, non-exclusive rule evaluations.

use serde::{Deserialize, Serialize};

use crate::domain::features::FeatureVector;

/// Comparison applied by a tag rule.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Comparison {
    Below(f64),
    Above(f64),
    AtLeast(f64),
    IsTrue,
}

/// A rule that attaches a tag when a supplied feature crosses a threshold.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    pub tag: &'static str,
    pub feature: &'static str,
    comparison: Comparison,
    /// Margin past the threshold at which confidence saturates.
    scale: f64,
}

/// A tag attached to an entity, with its own confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub confidence: f64,
}

const RULES: &[TagRule] = &[
    TagRule { tag: "profitable", feature: "burn_multiple", comparison: Comparison::Below(1.0), scale: 1.0 },
    TagRule { tag: "hypergrowth", feature: "revenue_growth_rate_percent", comparison: Comparison::Above(100.0), scale: 100.0 },
    TagRule { tag: "capital_efficient", feature: "ltv_cac_ratio", comparison: Comparison::Above(3.0), scale: 3.0 },
    TagRule { tag: "high_retention", feature: "net_dollar_retention_percent", comparison: Comparison::Above(120.0), scale: 30.0 },
    TagRule { tag: "large_market", feature: "tam_size_usd", comparison: Comparison::AtLeast(10_000_000_000.0), scale: 90_000_000_000.0 },
    TagRule { tag: "network_effects", feature: "network_effects_present", comparison: Comparison::IsTrue, scale: 1.0 },
    TagRule { tag: "ip_protected", feature: "patent_count", comparison: Comparison::AtLeast(3.0), scale: 7.0 },
    TagRule { tag: "repeat_founders", feature: "prior_successful_exits_count", comparison: Comparison::AtLeast(1.0), scale: 2.0 },
    TagRule { tag: "lean_team", feature: "team_size", comparison: Comparison::Below(10.0), scale: 10.0 },
    TagRule { tag: "long_runway", feature: "runway_months", comparison: Comparison::Above(24.0), scale: 24.0 },
    TagRule { tag: "runway_risk", feature: "runway_months", comparison: Comparison::Below(6.0), scale: 6.0 },
    TagRule { tag: "concentration_risk", feature: "customer_concentration_percent", comparison: Comparison::Above(40.0), scale: 40.0 },
];

impl TagRule {
    /// The full rule table, in evaluation order.
    pub fn all() -> &'static [TagRule] {
        RULES
    }

    /// Evaluates this rule. Returns the tag confidence, or `None` if the
    /// feature is absent or the condition does not hold.
    ///
    /// Confidence starts at 0.5 right at the threshold and reaches 1.0 once
    /// the value is `scale` past it.
    pub fn evaluate(&self, vector: &FeatureVector) -> Option<f64> {
        if !vector.is_present(self.feature) {
            return None;
        }
        let value = vector.numeric(self.feature);
        let margin = match self.comparison {
            Comparison::Below(t) if value < t => t - value,
            Comparison::Above(t) if value > t => value - t,
            Comparison::AtLeast(t) if value >= t => value - t,
            Comparison::IsTrue if value != 0.0 => return Some(1.0),
            _ => return None,
        };
        let saturation = if self.scale > 0.0 { (margin / self.scale).min(1.0) } else { 1.0 };
        Some(0.5 + 0.5 * saturation)
    }
}

/// Evaluates every tag rule independently.
pub fn evaluate_tags(vector: &FeatureVector) -> Vec<Tag> {
    RULES
        .iter()
        .filter_map(|rule| {
            rule.evaluate(vector).map(|confidence| Tag {
                name: rule.tag.to_string(),
                confidence,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vector(value: serde_json::Value) -> FeatureVector {
        FeatureVector::from_record(value.as_object().unwrap())
    }

    fn names(tags: &[Tag]) -> Vec<&str> {
        tags.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn profitable_and_hypergrowth_are_independent() {
        let tags = evaluate_tags(&vector(json!({
            "burn_multiple": 0.8,
            "revenue_growth_rate_percent": 150,
            "team_size": 60
        })));
        let names = names(&tags);
        assert!(names.contains(&"profitable"));
        assert!(names.contains(&"hypergrowth"));
        assert!(!names.contains(&"lean_team"));
    }

    #[test]
    fn absent_features_produce_no_tags() {
        assert!(evaluate_tags(&FeatureVector::empty()).is_empty());
    }

    #[test]
    fn confidence_scales_with_margin() {
        let near = evaluate_tags(&vector(json!({"burn_multiple": 0.95})));
        let far = evaluate_tags(&vector(json!({"burn_multiple": 0.1})));
        assert!(near[0].confidence < far[0].confidence);
        assert!(near[0].confidence >= 0.5);
        assert!(far[0].confidence <= 1.0);
    }

    #[test]
    fn threshold_itself_is_not_tagged_for_strict_rules() {
        let tags = evaluate_tags(&vector(json!({"revenue_growth_rate_percent": 100})));
        assert!(!names(&tags).contains(&"hypergrowth"));
    }

    #[test]
    fn boolean_rule_has_full_confidence() {
        let tags = evaluate_tags(&vector(json!({"network_effects_present": true})));
        assert_eq!(tags, vec![Tag { name: "network_effects".into(), confidence: 1.0 }]);
    }

    #[test]
    fn tags_are_not_exclusive() {
        let tags = evaluate_tags(&vector(json!({"runway_months": 3, "team_size": 4})));
        assert_eq!(names(&tags), vec!["lean_team", "runway_risk"]);
    }
}
