//! Quality scoring of rendered scenes.
//!
//! The actual visual judgment comes from the injected [`VisionEvaluator`].
//! This module owns everything around it: building the evaluation request
//! deterministically, defensively normalizing the response, and degrading
//! to a conservative placeholder when the evaluator is missing or returns
//! garbage, so a broken dependency never blocks the pipeline.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use reelgen_models::{IssueType, QualityIssue, Scene, SceneQualityScore, Severity, SubScores};

use crate::providers::{EvaluationRequest, RawEvaluation, RawIssue, VisionEvaluator};
use crate::retry::{retry_if, RetryConfig};

/// Default for a sub-score the evaluator omitted. Just-passing, never 0,
/// so a partial response cannot fail a scene on its own.
const DEFAULT_SUB_SCORE: u8 = 70;

/// Sub-score used across the board when no evaluation happened at all.
const PLACEHOLDER_SUB_SCORE: u8 = 75;

/// Scores one rendered frame against scene context.
pub struct QualityScorer {
    evaluator: Option<Arc<dyn VisionEvaluator>>,
    threshold: u8,
    retry: RetryConfig,
}

impl QualityScorer {
    /// Create a scorer. `evaluator` may be `None` when the vision service
    /// is not configured; every evaluation then yields the placeholder.
    pub fn new(evaluator: Option<Arc<dyn VisionEvaluator>>, threshold: u8) -> Self {
        Self {
            evaluator,
            threshold,
            retry: RetryConfig::new("vision_evaluate"),
        }
    }

    /// Evaluate one representative frame of a scene.
    ///
    /// Never fails: evaluator errors and malformed payloads degrade to the
    /// placeholder score.
    pub async fn evaluate_scene(&self, scene: &Scene, frame: &[u8]) -> SceneQualityScore {
        let Some(evaluator) = &self.evaluator else {
            counter!("reelgen_evaluator_fallbacks_total").increment(1);
            debug!(scene_id = %scene.id, "No vision evaluator configured, using placeholder score");
            return self.placeholder(scene, "vision evaluator not configured");
        };

        let request = EvaluationRequest::for_scene(scene);
        let payload = retry_if(
            &self.retry,
            || evaluator.evaluate(frame, &request),
            |e| e.is_retryable(),
        )
        .await;

        let payload = match payload {
            Ok(p) => p,
            Err(e) => {
                counter!("reelgen_evaluator_fallbacks_total").increment(1);
                warn!(scene_id = %scene.id, error = %e, "Vision evaluation failed, using placeholder score");
                return self.placeholder(scene, "evaluator unavailable");
            }
        };

        let raw: RawEvaluation = match serde_json::from_value(payload) {
            Ok(raw) => raw,
            Err(e) => {
                counter!("reelgen_evaluator_fallbacks_total").increment(1);
                warn!(scene_id = %scene.id, error = %e, "Malformed evaluator payload, using placeholder score");
                return self.placeholder(scene, "evaluator response malformed");
            }
        };

        counter!("reelgen_evaluations_total").increment(1);
        self.normalize(scene, raw)
    }

    /// Turn a raw evaluator payload into an immutable score record,
    /// defaulting missing sub-scores and dropping unparseable issues.
    fn normalize(&self, scene: &Scene, raw: RawEvaluation) -> SceneQualityScore {
        let scores = SubScores::new(
            clamp_sub_score(raw.scores.composition),
            clamp_sub_score(raw.scores.visibility),
            clamp_sub_score(raw.scores.technical_quality),
            clamp_sub_score(raw.scores.content_match),
            clamp_sub_score(raw.scores.professional_look),
        );

        let issues = raw
            .issues
            .into_iter()
            .filter_map(|issue| parse_issue(scene, issue))
            .collect();

        SceneQualityScore::new(&scene.id, scene.index, scores, issues, self.threshold)
    }

    fn placeholder(&self, scene: &Scene, reason: &str) -> SceneQualityScore {
        let scores = SubScores::new(
            PLACEHOLDER_SUB_SCORE,
            PLACEHOLDER_SUB_SCORE,
            PLACEHOLDER_SUB_SCORE,
            PLACEHOLDER_SUB_SCORE,
            PLACEHOLDER_SUB_SCORE,
        );
        let issues = vec![QualityIssue::new(
            IssueType::Technical,
            Severity::Minor,
            format!("could not evaluate: {reason}"),
            scene.index,
        )];
        SceneQualityScore::new(&scene.id, scene.index, scores, issues, self.threshold)
    }
}

fn clamp_sub_score(value: Option<f64>) -> u8 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0).round() as u8,
        _ => DEFAULT_SUB_SCORE,
    }
}

fn parse_issue(scene: &Scene, raw: RawIssue) -> Option<QualityIssue> {
    let type_str = raw.issue_type?;
    let issue_type = parse_issue_type(&type_str).or_else(|| {
        warn!(scene_id = %scene.id, issue_type = %type_str, "Dropping unknown issue type from evaluator");
        None
    })?;

    let severity = raw
        .severity
        .as_deref()
        .and_then(parse_severity)
        .unwrap_or(Severity::Minor);

    let description = raw
        .description
        .unwrap_or_else(|| format!("{} flagged by evaluator", issue_type.as_str()));

    Some(QualityIssue::new(issue_type, severity, description, scene.index))
}

fn parse_issue_type(s: &str) -> Option<IssueType> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
}

fn parse_severity(s: &str) -> Option<Severity> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase())).ok()
}
