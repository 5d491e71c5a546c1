//! The canonical feature contract.
//!
//! Every component (classifiers, matcher, per-axis models, fallback) reads
//! features through this single ordered schema. Changing the order or a
//! vocabulary changes the one-of-k encoding and invalidates trained artifacts.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Funding stages, earliest first. Unseen values map to the first entry.
pub const FUNDING_STAGES: &[&str] = &[
    "pre_seed", "seed", "series_a", "series_b", "series_c", "growth",
];

/// Lead investor tiers. Unseen values map to `none`.
pub const INVESTOR_TIERS: &[&str] = &["none", "angel", "tier_3", "tier_2", "tier_1"];

/// Product maturity stages. Unseen values map to `concept`.
pub const PRODUCT_STAGES: &[&str] = &["concept", "mvp", "beta", "launched", "growth", "mature"];

/// Sectors. Unseen values map to `other`.
pub const SECTORS: &[&str] = &[
    "other",
    "saas",
    "fintech",
    "healthtech",
    "ecommerce",
    "marketplace",
    "deeptech",
    "consumer",
    "enterprise",
    "climate",
];

/// The four composite evaluation pillars (Capital, Advantage, Market, People).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Capital,
    Advantage,
    Market,
    People,
}

impl Pillar {
    /// Returns all pillars in canonical order.
    pub fn all() -> &'static [Pillar] {
        &[Pillar::Capital, Pillar::Advantage, Pillar::Market, Pillar::People]
    }

    /// Returns the 0-based index of this pillar.
    pub fn index(&self) -> usize {
        match self {
            Pillar::Capital => 0,
            Pillar::Advantage => 1,
            Pillar::Market => 2,
            Pillar::People => 3,
        }
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Pillar::Capital => "Capital",
            Pillar::Advantage => "Advantage",
            Pillar::Market => "Market",
            Pillar::People => "People",
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Value type of a canonical feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureKind {
    Numeric,
    Boolean,
    /// One-of-k categorical; the first entry is the default and unknown bucket.
    Categorical(&'static [&'static str]),
}

/// How a feature maps onto a 0.0-1.0 indicator for the pillar scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalizer {
    /// Does not contribute to pillar scores.
    None,
    /// `(v - min) / (max - min)`, clamped.
    Linear { min: f64, max: f64 },
    /// Lower is better: `best` maps to 1.0, `worst` to 0.0.
    Inverse { best: f64, worst: f64 },
    /// `log10(v) / max_exp`, clamped; values at or below 1 map to 0.
    Log10 { max_exp: f64 },
    /// true => 1.0, false => 0.0.
    Flag,
    /// true => 0.0, false => 1.0.
    FlagInverse,
    /// Per-category score, aligned with the vocabulary.
    Ordinal(&'static [f64]),
}

impl Normalizer {
    /// Normalizes a raw numeric value. Booleans arrive as 1.0/0.0 and
    /// categoricals as their index.
    pub fn apply(&self, raw: f64) -> Option<f64> {
        let value = match *self {
            Normalizer::None => return None,
            Normalizer::Linear { min, max } => {
                if max <= min {
                    return None;
                }
                (raw - min) / (max - min)
            }
            Normalizer::Inverse { best, worst } => {
                if (worst - best).abs() < f64::EPSILON {
                    return None;
                }
                (worst - raw) / (worst - best)
            }
            Normalizer::Log10 { max_exp } => {
                if raw <= 1.0 || max_exp <= 0.0 {
                    0.0
                } else {
                    raw.log10() / max_exp
                }
            }
            Normalizer::Flag => {
                if raw != 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Normalizer::FlagInverse => {
                if raw != 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Normalizer::Ordinal(scores) => {
                let idx = raw.max(0.0) as usize;
                *scores.get(idx).or_else(|| scores.first())?
            }
        };
        Some(value.clamp(0.0, 1.0))
    }
}

/// One entry of the canonical schema.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
    pub pillar: Pillar,
    pub normalizer: Normalizer,
}

const fn numeric(name: &'static str, pillar: Pillar, normalizer: Normalizer) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Numeric,
        pillar,
        normalizer,
    }
}

const fn boolean(name: &'static str, pillar: Pillar, normalizer: Normalizer) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Boolean,
        pillar,
        normalizer,
    }
}

const fn categorical(
    name: &'static str,
    vocabulary: &'static [&'static str],
    pillar: Pillar,
    normalizer: Normalizer,
) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Categorical(vocabulary),
        pillar,
        normalizer,
    }
}

/// The 45 canonical features, in contract order.
pub static FEATURES: &[FeatureSpec] = &[
    // Capital
    categorical(
        "funding_stage",
        FUNDING_STAGES,
        Pillar::Capital,
        Normalizer::Ordinal(&[0.1, 0.25, 0.45, 0.65, 0.8, 0.9]),
    ),
    numeric("total_capital_raised_usd", Pillar::Capital, Normalizer::Log10 { max_exp: 9.0 }),
    numeric("cash_on_hand_usd", Pillar::Capital, Normalizer::Log10 { max_exp: 8.0 }),
    numeric("monthly_burn_usd", Pillar::Capital, Normalizer::None),
    numeric("runway_months", Pillar::Capital, Normalizer::Linear { min: 0.0, max: 24.0 }),
    numeric("burn_multiple", Pillar::Capital, Normalizer::Inverse { best: 0.5, worst: 4.0 }),
    categorical(
        "investor_tier_primary",
        INVESTOR_TIERS,
        Pillar::Capital,
        Normalizer::Ordinal(&[0.1, 0.3, 0.5, 0.75, 1.0]),
    ),
    boolean("has_debt", Pillar::Capital, Normalizer::None),
    // Advantage
    numeric("patent_count", Pillar::Advantage, Normalizer::Linear { min: 0.0, max: 10.0 }),
    boolean("network_effects_present", Pillar::Advantage, Normalizer::Flag),
    boolean("has_data_moat", Pillar::Advantage, Normalizer::Flag),
    boolean("regulatory_advantage_present", Pillar::Advantage, Normalizer::Flag),
    numeric("tech_differentiation_score", Pillar::Advantage, Normalizer::Linear { min: 1.0, max: 5.0 }),
    numeric("switching_cost_score", Pillar::Advantage, Normalizer::Linear { min: 1.0, max: 5.0 }),
    numeric("brand_strength_score", Pillar::Advantage, Normalizer::Linear { min: 1.0, max: 5.0 }),
    numeric("scalability_score", Pillar::Advantage, Normalizer::Linear { min: 1.0, max: 5.0 }),
    categorical(
        "product_stage",
        PRODUCT_STAGES,
        Pillar::Advantage,
        Normalizer::Ordinal(&[0.1, 0.3, 0.45, 0.65, 0.85, 0.9]),
    ),
    // Market
    categorical("sector", SECTORS, Pillar::Market, Normalizer::None),
    numeric("tam_size_usd", Pillar::Market, Normalizer::Log10 { max_exp: 11.0 }),
    numeric("sam_size_usd", Pillar::Market, Normalizer::Log10 { max_exp: 10.0 }),
    numeric("som_size_usd", Pillar::Market, Normalizer::Log10 { max_exp: 9.0 }),
    numeric("market_growth_rate_percent", Pillar::Market, Normalizer::Linear { min: 0.0, max: 50.0 }),
    numeric("customer_count", Pillar::Market, Normalizer::Log10 { max_exp: 5.0 }),
    numeric("customer_concentration_percent", Pillar::Market, Normalizer::Inverse { best: 5.0, worst: 80.0 }),
    numeric("user_growth_rate_percent", Pillar::Market, Normalizer::Linear { min: 0.0, max: 200.0 }),
    numeric("net_dollar_retention_percent", Pillar::Market, Normalizer::Linear { min: 70.0, max: 150.0 }),
    numeric("competition_intensity", Pillar::Market, Normalizer::Inverse { best: 1.0, worst: 5.0 }),
    numeric("competitors_named_count", Pillar::Market, Normalizer::None),
    numeric("annual_revenue_run_rate", Pillar::Market, Normalizer::Log10 { max_exp: 8.0 }),
    numeric("revenue_growth_rate_percent", Pillar::Market, Normalizer::Linear { min: 0.0, max: 200.0 }),
    numeric("gross_margin_percent", Pillar::Market, Normalizer::Linear { min: 0.0, max: 90.0 }),
    numeric("ltv_cac_ratio", Pillar::Market, Normalizer::Linear { min: 0.0, max: 5.0 }),
    numeric("product_retention_30d", Pillar::Market, Normalizer::Linear { min: 0.0, max: 100.0 }),
    numeric("product_retention_90d", Pillar::Market, Normalizer::Linear { min: 0.0, max: 100.0 }),
    numeric("dau_mau_ratio", Pillar::Market, Normalizer::Linear { min: 0.0, max: 0.5 }),
    // People
    numeric("founders_count", Pillar::People, Normalizer::None),
    numeric("team_size", Pillar::People, Normalizer::Log10 { max_exp: 2.5 }),
    numeric("years_experience_avg", Pillar::People, Normalizer::Linear { min: 0.0, max: 15.0 }),
    numeric("domain_expertise_years_avg", Pillar::People, Normalizer::Linear { min: 0.0, max: 10.0 }),
    numeric("prior_startup_experience_count", Pillar::People, Normalizer::Linear { min: 0.0, max: 3.0 }),
    numeric("prior_successful_exits_count", Pillar::People, Normalizer::Linear { min: 0.0, max: 2.0 }),
    numeric("board_experience_score", Pillar::People, Normalizer::Linear { min: 1.0, max: 5.0 }),
    numeric("advisors_count", Pillar::People, Normalizer::Linear { min: 0.0, max: 8.0 }),
    numeric("team_diversity_percent", Pillar::People, Normalizer::Linear { min: 0.0, max: 50.0 }),
    boolean("key_person_dependency", Pillar::People, Normalizer::FlagInverse),
];

static INDEX: Lazy<HashMap<&'static str, usize>> =
    Lazy::new(|| FEATURES.iter().enumerate().map(|(i, f)| (f.name, i)).collect());

static ENCODED_NAMES: Lazy<Vec<String>> = Lazy::new(|| {
    let mut names = Vec::new();
    for spec in FEATURES {
        match spec.kind {
            FeatureKind::Categorical(vocabulary) => {
                names.extend(vocabulary.iter().map(|v| format!("{}={}", spec.name, v)));
            }
            _ => names.push(spec.name.to_string()),
        }
    }
    names
});

static ENCODED_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    ENCODED_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect()
});

/// Number of canonical features.
pub fn feature_count() -> usize {
    FEATURES.len()
}

/// Position of a canonical feature in contract order.
pub fn feature_index(name: &str) -> Option<usize> {
    INDEX.get(name).copied()
}

/// Looks up the schema entry for a canonical feature.
pub fn feature_spec(name: &str) -> Option<&'static FeatureSpec> {
    feature_index(name).map(|i| &FEATURES[i])
}

/// Column names of the one-of-k encoded model input, in order.
pub fn encoded_names() -> &'static [String] {
    &ENCODED_NAMES
}

/// Position of an encoded column (`team_size`, `sector=saas`).
pub fn encoded_index(name: &str) -> Option<usize> {
    ENCODED_INDEX.get(name).copied()
}
