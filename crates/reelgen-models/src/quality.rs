//! Quality scores and classified quality issues.
//!
//! A `SceneQualityScore` is produced once per evaluation pass and is
//! immutable after construction: the derived fields (`overall_score`,
//! `passes_threshold`, `needs_regeneration`) are computed in the
//! constructor and never recomputed elsewhere.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Closed set of quality issue classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    /// Rendered content collides with an expected text overlay region
    TextOverlap,
    /// A face is blocked by another element
    FaceBlocked,
    /// Subject is hard to see (lighting, clutter, contrast)
    PoorVisibility,
    /// Framing/layout is unbalanced or awkward
    BadComposition,
    /// Encoding or rendering artifacts
    Technical,
    /// Visual does not match the scene's topic
    ContentMismatch,
    /// The generator hallucinated rendered text
    AiTextDetected,
    /// The generator hallucinated a user interface
    AiUiDetected,
    /// Content conflicts with brand guidelines
    OffBrandContent,
    /// A required brand element is absent
    MissingBrandElement,
    /// Shot framing differs from what the scene called for
    WrongFraming,
    /// Expected text overlay space is not usable
    MissingTextOverlay,
}

impl IssueType {
    /// Returns the issue type as its kebab-case wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextOverlap => "text-overlap",
            Self::FaceBlocked => "face-blocked",
            Self::PoorVisibility => "poor-visibility",
            Self::BadComposition => "bad-composition",
            Self::Technical => "technical",
            Self::ContentMismatch => "content-mismatch",
            Self::AiTextDetected => "ai-text-detected",
            Self::AiUiDetected => "ai-ui-detected",
            Self::OffBrandContent => "off-brand-content",
            Self::MissingBrandElement => "missing-brand-element",
            Self::WrongFraming => "wrong-framing",
            Self::MissingTextOverlay => "missing-text-overlay",
        }
    }

    /// Returns true for AI-hallucination or brand-policy issues that demand
    /// prompt restrictions rather than compositional fixes.
    pub fn is_policy_issue(&self) -> bool {
        matches!(
            self,
            Self::AiTextDetected | Self::AiUiDetected | Self::OffBrandContent
        )
    }

    /// Returns true for issues in the composition/visibility family.
    pub fn is_composition_issue(&self) -> bool {
        matches!(
            self,
            Self::TextOverlap
                | Self::FaceBlocked
                | Self::PoorVisibility
                | Self::BadComposition
                | Self::WrongFraming
        )
    }
}

/// Severity of a quality issue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl Severity {
    /// Returns the severity as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Critical => "critical",
        }
    }
}

/// One classified problem with a rendered scene.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QualityIssue {
    /// Issue classification
    pub issue_type: IssueType,

    /// How badly the issue affects the scene
    pub severity: Severity,

    /// Human-readable description from the evaluator
    pub description: String,

    /// Index of the scene the issue belongs to
    pub scene_index: u32,
}

impl QualityIssue {
    /// Create a new quality issue.
    pub fn new(
        issue_type: IssueType,
        severity: Severity,
        description: impl Into<String>,
        scene_index: u32,
    ) -> Self {
        Self {
            issue_type,
            severity,
            description: description.into(),
            scene_index,
        }
    }

    /// Returns true if the issue is critical.
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// The five quality sub-scores, each 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SubScores {
    pub composition: u8,
    pub visibility: u8,
    pub technical_quality: u8,
    pub content_match: u8,
    pub professional_look: u8,
}

impl SubScores {
    /// Create sub-scores, clamping each value to 0-100.
    pub fn new(
        composition: u8,
        visibility: u8,
        technical_quality: u8,
        content_match: u8,
        professional_look: u8,
    ) -> Self {
        Self {
            composition: composition.min(100),
            visibility: visibility.min(100),
            technical_quality: technical_quality.min(100),
            content_match: content_match.min(100),
            professional_look: professional_look.min(100),
        }
    }

    /// Rounded mean of the five sub-scores.
    pub fn overall(&self) -> u8 {
        let sum = self.composition as u16
            + self.visibility as u16
            + self.technical_quality as u16
            + self.content_match as u16
            + self.professional_look as u16;
        ((sum as f64) / 5.0).round() as u8
    }
}

/// Quality evaluation of one rendered scene. One per evaluation pass.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneQualityScore {
    /// Scene identifier
    pub scene_id: String,

    /// Scene index within the video
    pub scene_index: u32,

    /// The five sub-scores
    pub scores: SubScores,

    /// Rounded mean of the sub-scores
    pub overall_score: u8,

    /// Classified issues found by the evaluator
    pub issues: Vec<QualityIssue>,

    /// True when the overall score meets the threshold and no issue is critical
    pub passes_threshold: bool,

    /// True when the scene should be regenerated
    pub needs_regeneration: bool,
}

impl SceneQualityScore {
    /// Build a score record, deriving `overall_score`, `passes_threshold`
    /// and `needs_regeneration`.
    ///
    /// A critical issue forces `passes_threshold` to false regardless of the
    /// overall score.
    pub fn new(
        scene_id: impl Into<String>,
        scene_index: u32,
        scores: SubScores,
        issues: Vec<QualityIssue>,
        threshold: u8,
    ) -> Self {
        let overall_score = scores.overall();
        let has_critical = issues.iter().any(QualityIssue::is_critical);
        let passes_threshold = overall_score >= threshold && !has_critical;

        Self {
            scene_id: scene_id.into(),
            scene_index,
            scores,
            overall_score,
            issues,
            passes_threshold,
            needs_regeneration: !passes_threshold,
        }
    }

    /// Returns true if any issue has critical severity.
    pub fn has_critical_issue(&self) -> bool {
        self.issues.iter().any(QualityIssue::is_critical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_is_rounded_mean() {
        // Scenario B from the quality model: mean of 72,68,80,75,70 is 73.
        let scores = SubScores::new(72, 68, 80, 75, 70);
        assert_eq!(scores.overall(), 73);

        let scores = SubScores::new(70, 70, 70, 70, 71);
        assert_eq!(scores.overall(), 70); // 70.2 rounds down

        let scores = SubScores::new(100, 100, 100, 100, 100);
        assert_eq!(scores.overall(), 100);
    }

    #[test]
    fn test_sub_scores_clamped() {
        let scores = SubScores::new(150, 200, 70, 70, 70);
        assert_eq!(scores.composition, 100);
        assert_eq!(scores.visibility, 100);
    }

    #[test]
    fn test_passing_score_with_minor_issue() {
        let scores = SubScores::new(72, 68, 80, 75, 70);
        let issues = vec![QualityIssue::new(
            IssueType::Technical,
            Severity::Minor,
            "slight banding in the sky gradient",
            0,
        )];
        let score = SceneQualityScore::new("s1", 0, scores, issues, 70);
        assert_eq!(score.overall_score, 73);
        assert!(score.passes_threshold);
        assert!(!score.needs_regeneration);
    }

    #[test]
    fn test_critical_issue_forces_failure() {
        let scores = SubScores::new(90, 90, 90, 90, 90);
        let issues = vec![QualityIssue::new(
            IssueType::AiTextDetected,
            Severity::Critical,
            "garbled text rendered across the product",
            0,
        )];
        let score = SceneQualityScore::new("s1", 0, scores, issues, 70);
        assert_eq!(score.overall_score, 90);
        assert!(!score.passes_threshold);
        assert!(score.needs_regeneration);
    }

    #[test]
    fn test_below_threshold_fails() {
        let scores = SubScores::new(60, 60, 60, 60, 60);
        let score = SceneQualityScore::new("s1", 0, scores, vec![], 70);
        assert!(!score.passes_threshold);
    }

    #[test]
    fn test_issue_type_wire_names() {
        let json = serde_json::to_string(&IssueType::AiTextDetected).unwrap();
        assert_eq!(json, "\"ai-text-detected\"");
        let parsed: IssueType = serde_json::from_str("\"text-overlap\"").unwrap();
        assert_eq!(parsed, IssueType::TextOverlap);
    }

    #[test]
    fn test_issue_families() {
        assert!(IssueType::AiUiDetected.is_policy_issue());
        assert!(!IssueType::BadComposition.is_policy_issue());
        assert!(IssueType::WrongFraming.is_composition_issue());
        assert!(!IssueType::ContentMismatch.is_composition_issue());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Major);
        assert!(Severity::Major > Severity::Minor);
    }
}
