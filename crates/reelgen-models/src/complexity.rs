//! Prompt complexity analysis models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::provider::Provider;

/// How difficult a visual direction is for current video generators.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityCategory {
    Simple,
    Moderate,
    Complex,
    Impossible,
}

impl ComplexityCategory {
    /// Category boundaries are exact: >=0.8 impossible, >=0.5 complex,
    /// >=0.3 moderate, else simple.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Impossible
        } else if score >= 0.5 {
            Self::Complex
        } else if score >= 0.3 {
            Self::Moderate
        } else {
            Self::Simple
        }
    }

    /// Returns the category as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
            Self::Impossible => "impossible",
        }
    }
}

/// Rating of one difficulty factor within a visual direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FactorRating {
    #[default]
    NotPresent,
    Hard,
    VeryHard,
}

impl FactorRating {
    /// Returns the rating as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotPresent => "not-present",
            Self::Hard => "hard",
            Self::VeryHard => "very-hard",
        }
    }
}

/// Per-factor breakdown of a complexity analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct ComplexityBreakdown {
    /// Specific physical action difficulty (very-hard with hand/finger work)
    pub specific_action: FactorRating,

    /// Material property difficulty (very-hard for translucency, liquidity,
    /// reflectivity)
    pub material_properties: FactorRating,

    /// Precise directional motion difficulty
    pub motion: FactorRating,

    /// Count of domain-specific nouns matched (contribution is capped)
    pub domain_terms: u32,

    /// Whether temporal-sequence words (then/while/after) are present
    pub temporal_sequence: bool,
}

/// Result of analyzing a visual direction's difficulty.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComplexityAnalysis {
    /// Composite difficulty score in [0, 1]
    pub score: f64,

    /// Category derived from the score
    pub category: ComplexityCategory,

    /// Per-factor breakdown
    pub breakdown: ComplexityBreakdown,

    /// Providers best suited to this prompt, in preference order
    pub recommended_providers: Vec<Provider>,

    /// Providers likely to fail on this prompt
    pub avoid_providers: Vec<Provider>,

    /// Whether conditioning on a reference image is advised
    pub suggest_reference_image: bool,

    /// Simplified prompt with the offending properties stripped, when the
    /// direction is complex or impossible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simplified_prompt: Option<String>,

    /// Human-readable warning about the difficulty, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ComplexityAnalysis {
    /// A trivially simple analysis (no factors matched).
    pub fn simple() -> Self {
        Self {
            score: 0.0,
            category: ComplexityCategory::Simple,
            breakdown: ComplexityBreakdown::default(),
            recommended_providers: Vec::new(),
            avoid_providers: Vec::new(),
            suggest_reference_image: false,
            simplified_prompt: None,
            warning: None,
        }
    }
}
