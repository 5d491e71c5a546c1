//! The eight master categories that group business patterns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level grouping of business patterns. Used as the tier-1 gate of the
/// hierarchical classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasterCategory {
    EfficientGrowth,
    VentureHypergrowth,
    CapitalEfficient,
    B2bEnterprise,
    PlatformNetwork,
    ConsumerDirect,
    DeepTech,
    VerticalSpecialist,
}

impl MasterCategory {
    /// Returns all categories in canonical order.
    pub fn all() -> &'static [MasterCategory] {
        &[
            MasterCategory::EfficientGrowth,
            MasterCategory::VentureHypergrowth,
            MasterCategory::CapitalEfficient,
            MasterCategory::B2bEnterprise,
            MasterCategory::PlatformNetwork,
            MasterCategory::ConsumerDirect,
            MasterCategory::DeepTech,
            MasterCategory::VerticalSpecialist,
        ]
    }

    /// Returns the snake_case identifier used in artifacts.
    pub fn as_str(&self) -> &'static str {
        match self {
            MasterCategory::EfficientGrowth => "efficient_growth",
            MasterCategory::VentureHypergrowth => "venture_hypergrowth",
            MasterCategory::CapitalEfficient => "capital_efficient",
            MasterCategory::B2bEnterprise => "b2b_enterprise",
            MasterCategory::PlatformNetwork => "platform_network",
            MasterCategory::ConsumerDirect => "consumer_direct",
            MasterCategory::DeepTech => "deep_tech",
            MasterCategory::VerticalSpecialist => "vertical_specialist",
        }
    }

    /// Parses the snake_case identifier.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.as_str() == raw)
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            MasterCategory::EfficientGrowth => "Efficient Growth",
            MasterCategory::VentureHypergrowth => "Venture Hypergrowth",
            MasterCategory::CapitalEfficient => "Capital Efficient",
            MasterCategory::B2bEnterprise => "B2B Enterprise",
            MasterCategory::PlatformNetwork => "Platform & Network",
            MasterCategory::ConsumerDirect => "Consumer Direct",
            MasterCategory::DeepTech => "Deep Tech",
            MasterCategory::VerticalSpecialist => "Vertical Specialist",
        }
    }
}

impl fmt::Display for MasterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
