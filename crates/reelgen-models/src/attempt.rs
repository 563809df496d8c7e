//! Regeneration attempt records.
//!
//! Attempts are append-only: once written to the ledger they are never
//! mutated or deleted except by an explicit admin history reset.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::provider::Provider;
use crate::quality::QualityIssue;
use crate::strategy::StrategyApproach;

/// Outcome classification of one regeneration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttemptResult {
    /// Generation completed and the result passed the quality threshold
    Success,
    /// Generation failed, timed out, or errored
    Failure,
    /// No clean outcome: either the render completed but missed the quality
    /// threshold, or the attempt was a terminal stock-footage recommendation
    /// with no generation performed
    Partial,
}

impl AttemptResult {
    /// Returns the result as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Partial => "partial",
        }
    }
}

/// One recorded (prompt -> generate -> evaluate) cycle for a scene.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RegenerationAttempt {
    /// Record identifier (UUID)
    pub id: String,

    /// Scene this attempt belongs to
    pub scene_id: String,

    /// Project the scene belongs to
    pub project_id: String,

    /// Per-scene monotonic attempt number, assigned by the caller
    pub attempt_number: u32,

    /// When the attempt was recorded
    pub timestamp: DateTime<Utc>,

    /// Provider the generation was sent to
    pub provider: Provider,

    /// Strategy approach that produced this attempt
    pub approach: StrategyApproach,

    /// The exact prompt submitted to the provider
    pub prompt: String,

    /// Outcome classification
    pub result: AttemptResult,

    /// Overall quality score of the rendered result, if it was evaluated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u8>,

    /// Issues found in the rendered result, if it was evaluated
    #[serde(default)]
    pub issues: Vec<QualityIssue>,

    /// Why the strategy chose this attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    /// Strategy confidence at decision time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Whether the generation was conditioned on a reference image
    #[serde(default)]
    pub used_reference_image: bool,
}

impl RegenerationAttempt {
    /// Create a new attempt record with a fresh UUID and current timestamp.
    pub fn new(
        scene_id: impl Into<String>,
        project_id: impl Into<String>,
        attempt_number: u32,
        provider: Provider,
        approach: StrategyApproach,
        prompt: impl Into<String>,
        result: AttemptResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scene_id: scene_id.into(),
            project_id: project_id.into(),
            attempt_number,
            timestamp: Utc::now(),
            provider,
            approach,
            prompt: prompt.into(),
            result,
            quality_score: None,
            issues: Vec::new(),
            reasoning: None,
            confidence: None,
            used_reference_image: false,
        }
    }

    /// Attach the quality evaluation of the rendered result.
    pub fn with_quality(mut self, score: u8, issues: Vec<QualityIssue>) -> Self {
        self.quality_score = Some(score);
        self.issues = issues;
        self
    }

    /// Attach the strategy's reasoning and confidence.
    pub fn with_decision(mut self, reasoning: impl Into<String>, confidence: f64) -> Self {
        self.reasoning = Some(reasoning.into());
        self.confidence = Some(confidence);
        self
    }

    /// Mark the attempt as reference-image conditioned.
    pub fn with_reference_image(mut self) -> Self {
        self.used_reference_image = true;
        self
    }

    /// Returns true if this attempt was a failure.
    pub fn is_failure(&self) -> bool {
        self.result == AttemptResult::Failure
    }
}
