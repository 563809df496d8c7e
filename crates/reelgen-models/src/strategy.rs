//! Regeneration strategies and per-scene results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::provider::Provider;
use crate::quality::SceneQualityScore;

/// The next action to take for a failing scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyApproach {
    /// Retry on the same provider with a lightly perturbed prompt
    RetrySame,
    /// Retry with stronger negative prompting against hallucinated text
    RegenerateWithEnhancedNegativePrompt,
    /// Retry with content restrictions against hallucinated UI elements
    RegenerateWithContentRestrictions,
    /// Retry with brand guidance reinforced in the prompt
    RegenerateWithBrandGuidance,
    /// Retry conditioned on a reference image
    RegenerateWithReferenceImage,
    /// Retry with composition and visibility fixes in the prompt
    RegenerateWithCompositionFixes,
    /// Terminal recommendation: use stock footage instead of generating again
    StockFootage,
}

impl StrategyApproach {
    /// Returns the approach as its kebab-case wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RetrySame => "retry-same",
            Self::RegenerateWithEnhancedNegativePrompt => {
                "regenerate-with-enhanced-negative-prompt"
            }
            Self::RegenerateWithContentRestrictions => "regenerate-with-content-restrictions",
            Self::RegenerateWithBrandGuidance => "regenerate-with-brand-guidance",
            Self::RegenerateWithReferenceImage => "regenerate-with-reference-image",
            Self::RegenerateWithCompositionFixes => "regenerate-with-composition-fixes",
            Self::StockFootage => "stock-footage",
        }
    }

    /// Returns true if this approach ends the retry loop (no API call).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::StockFootage)
    }
}

/// Concrete changes a strategy wants applied to the next attempt.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct StrategyChanges {
    /// Switch to this provider (None keeps the current one)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,

    /// Replace the prompt with this text (None keeps the current prompt)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Condition the generation on a reference image
    #[serde(default)]
    pub use_reference: bool,

    /// Reference image URL when `use_reference` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
}

/// A computed next action with confidence and explanation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RegenerationStrategy {
    /// Chosen approach
    pub approach: StrategyApproach,

    /// Self-reported certainty in the approach, in [0, 1]
    pub confidence: f64,

    /// Why this approach was chosen. Never empty.
    pub reasoning: String,

    /// Concrete changes for the next attempt
    pub changes: StrategyChanges,

    /// Warning for the caller (e.g. prompt likely beyond generator ability)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Outcome of one `regenerate_scene` call, returned to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RegenerationResult {
    /// Scene identifier
    pub scene_id: String,

    /// Scene index within the video
    pub scene_index: u32,

    /// Attempt number this call recorded
    pub attempt_number: u32,

    /// Approach that was executed (or recommended, for stock footage)
    pub approach: StrategyApproach,

    /// Provider used, when a generation was performed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,

    /// True when a new render was produced and passed the threshold
    pub success: bool,

    /// URL of the newly rendered media, if generation succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,

    /// Quality evaluation of the new render, if one was performed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<SceneQualityScore>,

    /// Error string when generation failed or timed out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Strategy reasoning carried through for explainability
    pub reasoning: String,

    /// Strategy confidence carried through for explainability
    pub confidence: f64,
}
