//! The strategy engine: decide the next action for a failing scene.
//!
//! A pure, deterministic function over the scene's attempt history, the
//! prompt's complexity analysis, and the current prompt. Rules apply in
//! strict precedence order, first match wins; every branch explains itself
//! in `reasoning`, and a final guard ensures the engine never proposes an
//! exact (prompt, provider) pair that the history already contains.

use reelgen_models::{
    ComplexityCategory, IssueType, Provider, QualityIssue, RegenerationAttempt,
    RegenerationStrategy, StrategyApproach, StrategyChanges,
};

use crate::prompt;

/// Quality clauses appended, in order, to break an exact prompt repeat.
const PERTURBATION_CLAUSES: &[&str] = &[
    "sharp focus, professional quality",
    "cinematic lighting",
    "high level of detail",
];

/// Input to one strategy decision.
///
/// `prior_attempts` must be ordered most recent first, as returned by the
/// attempt ledger.
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a> {
    pub scene_id: &'a str,
    pub prior_attempts: &'a [RegenerationAttempt],
    pub complexity: &'a reelgen_models::ComplexityAnalysis,
    pub current_prompt: &'a str,
    pub original_prompt: &'a str,
    pub current_media_url: Option<&'a str>,
    /// Brand reference asset available for image conditioning, if any.
    pub reference_url: Option<&'a str>,
}

/// Computes regeneration strategies. Stateless apart from configuration.
#[derive(Debug, Clone)]
pub struct StrategyEngine {
    max_attempts: u32,
    max_negative_prompt_len: usize,
}

impl StrategyEngine {
    /// Create an engine with the given per-scene attempt budget.
    pub fn new(max_attempts: u32, max_negative_prompt_len: usize) -> Self {
        Self {
            max_attempts,
            max_negative_prompt_len,
        }
    }

    /// Decide the next action. Deterministic: identical input always yields
    /// an identical strategy.
    pub fn decide(&self, input: StrategyInput<'_>) -> RegenerationStrategy {
        // Rule 1: attempt budget exhausted. Checked before impossible
        // complexity: a hard resource limit trumps a heuristic rating.
        if input.prior_attempts.len() as u32 >= self.max_attempts {
            return RegenerationStrategy {
                approach: StrategyApproach::StockFootage,
                confidence: 0.9,
                reasoning: format!(
                    "Attempt budget exhausted for scene {}: {} attempts recorded against a limit of {}. Further generation is unlikely to converge; recommend licensed stock footage.",
                    input.scene_id,
                    input.prior_attempts.len(),
                    self.max_attempts
                ),
                changes: StrategyChanges::default(),
                warning: input.complexity.warning.clone(),
            };
        }

        // Rule 2: the prompt is rated impossible and reference conditioning
        // has not been tried, so spending attempts is wasteful.
        let reference_tried = input
            .prior_attempts
            .iter()
            .any(|a| a.used_reference_image);
        if input.complexity.category == ComplexityCategory::Impossible && !reference_tried {
            return RegenerationStrategy {
                approach: StrategyApproach::StockFootage,
                confidence: input.complexity.score.max(0.8).min(1.0),
                reasoning: format!(
                    "Visual direction is rated impossible for current generators (score {:.2}); recommend licensed stock footage instead of burning attempts.",
                    input.complexity.score
                ),
                changes: StrategyChanges::default(),
                warning: input.complexity.warning.clone(),
            };
        }

        let last_attempt = input.prior_attempts.first();

        // Rule 3: the last render hallucinated text/UI or broke brand
        // policy. All matching branches merge their prompt clauses.
        if let Some(last) = last_attempt {
            let policy_issues: Vec<QualityIssue> = last
                .issues
                .iter()
                .filter(|i| i.issue_type.is_policy_issue())
                .cloned()
                .collect();

            if !policy_issues.is_empty() {
                let approach = if policy_issues
                    .iter()
                    .any(|i| i.issue_type == IssueType::AiTextDetected)
                {
                    StrategyApproach::RegenerateWithEnhancedNegativePrompt
                } else if policy_issues
                    .iter()
                    .any(|i| i.issue_type == IssueType::AiUiDetected)
                {
                    StrategyApproach::RegenerateWithContentRestrictions
                } else {
                    StrategyApproach::RegenerateWithBrandGuidance
                };

                let provider = self.pick_provider(input, last.provider);
                let plan = prompt::synthesize(
                    input.current_prompt,
                    &policy_issues,
                    approach,
                    self.max_negative_prompt_len,
                );
                let next_prompt =
                    self.break_repeats(input.prior_attempts, provider, plan.prompt);

                let kinds: Vec<&str> = policy_issues
                    .iter()
                    .map(|i| i.issue_type.as_str())
                    .collect();
                return RegenerationStrategy {
                    approach,
                    confidence: 0.7,
                    reasoning: format!(
                        "Last attempt was rejected for {}; regenerating with restriction clauses merged into the prompt and negatives.",
                        kinds.join(", ")
                    ),
                    changes: StrategyChanges {
                        provider: Some(provider),
                        prompt: Some(next_prompt),
                        use_reference: false,
                        reference_url: None,
                    },
                    warning: None,
                };
            }
        }

        // Rule 4: the analyzer suggested reference conditioning, an asset
        // exists, and no attempt has tried it yet.
        if input.complexity.suggest_reference_image && !reference_tried {
            if let Some(reference_url) = input.reference_url {
                let provider = input
                    .complexity
                    .recommended_providers
                    .iter()
                    .copied()
                    .find(|p| p.supports_image_conditioning())
                    .unwrap_or(Provider::Runway);
                let plan = prompt::synthesize(
                    input.current_prompt,
                    &[],
                    StrategyApproach::RegenerateWithReferenceImage,
                    self.max_negative_prompt_len,
                );
                let next_prompt =
                    self.break_repeats(input.prior_attempts, provider, plan.prompt);

                return RegenerationStrategy {
                    approach: StrategyApproach::RegenerateWithReferenceImage,
                    confidence: 0.75,
                    reasoning: format!(
                        "Direction is {} and a brand reference image is available; conditioning on it anchors the elements generators get wrong.",
                        input.complexity.category.as_str()
                    ),
                    changes: StrategyChanges {
                        provider: Some(provider),
                        prompt: Some(next_prompt),
                        use_reference: true,
                        reference_url: Some(reference_url.to_string()),
                    },
                    warning: input.complexity.warning.clone(),
                };
            }
        }

        // Rule 5: a critical composition/visibility issue remains from the
        // last render.
        if let Some(last) = last_attempt {
            let critical_composition: Vec<QualityIssue> = last
                .issues
                .iter()
                .filter(|i| i.is_critical() && i.issue_type.is_composition_issue())
                .cloned()
                .collect();

            if !critical_composition.is_empty() {
                let provider = self.pick_provider(input, last.provider);
                let plan = prompt::synthesize(
                    input.current_prompt,
                    &critical_composition,
                    StrategyApproach::RegenerateWithCompositionFixes,
                    self.max_negative_prompt_len,
                );
                let next_prompt =
                    self.break_repeats(input.prior_attempts, provider, plan.prompt);

                return RegenerationStrategy {
                    approach: StrategyApproach::RegenerateWithCompositionFixes,
                    confidence: 0.6,
                    reasoning: format!(
                        "Last attempt had {} critical composition/visibility issue(s); regenerating with explicit framing guidance.",
                        critical_composition.len()
                    ),
                    changes: StrategyChanges {
                        provider: Some(provider),
                        prompt: Some(next_prompt),
                        use_reference: false,
                        reference_url: None,
                    },
                    warning: None,
                };
            }
        }

        // Rule 6: no strong signal. Lowest-confidence retry with a lightly
        // perturbed prompt.
        let provider = last_attempt.map(|a| a.provider).unwrap_or_default();
        let next_prompt = self.break_repeats(
            input.prior_attempts,
            provider,
            input.current_prompt.to_string(),
        );

        RegenerationStrategy {
            approach: StrategyApproach::RetrySame,
            confidence: 0.4,
            reasoning: "No dominant failure signal; retrying on the same provider with a lightly varied prompt.".to_string(),
            changes: StrategyChanges {
                provider: Some(provider),
                prompt: Some(next_prompt),
                use_reference: false,
                reference_url: None,
            },
            warning: None,
        }
    }

    /// Keep the last provider unless the complexity analyzer's
    /// recommendations exclude it.
    fn pick_provider(&self, input: StrategyInput<'_>, last: Provider) -> Provider {
        let recommended = &input.complexity.recommended_providers;
        if recommended.is_empty() || recommended.contains(&last) {
            last
        } else {
            recommended[0]
        }
    }

    /// Append quality clauses until the (prompt, provider) pair is not an
    /// exact repeat of a recorded attempt.
    fn break_repeats(
        &self,
        prior: &[RegenerationAttempt],
        provider: Provider,
        mut candidate: String,
    ) -> String {
        let is_repeat = |p: &str| {
            prior
                .iter()
                .any(|a| a.provider == provider && a.prompt == p)
        };
        for clause in PERTURBATION_CLAUSES {
            if !is_repeat(&candidate) {
                break;
            }
            candidate = format!("{candidate}, {clause}");
        }
        candidate
    }
}
