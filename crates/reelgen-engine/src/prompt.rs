//! Prompt synthesis from classified quality issues.
//!
//! Each issue type maps to a fixed set of prompt clauses and negative-prompt
//! additions. Additions are deduplicated with order-preserving set semantics
//! before appending, so regenerating the same issue repeatedly never grows
//! the prompt without bound.

use reelgen_models::{IssueType, QualityIssue, StrategyApproach};

/// Baseline negative prompt applied to every generation.
const NEGATIVE_BASELINE: &[&str] = &[
    "blurry",
    "distorted",
    "low quality",
    "watermark",
    "logo",
    "text",
    "amateur",
    "deformed",
    "disfigured",
];

/// A concrete prompt and negative prompt for the next generation.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPlan {
    pub prompt: String,
    pub negative_prompt: String,
}

/// Build the improved prompt and negative prompt for a set of issues under
/// the chosen approach.
///
/// The output strictly extends `base_prompt` for every issue type except
/// content-mismatch, which rewrites with an emphatic topic-reinforcing
/// prefix instead.
pub fn synthesize(
    base_prompt: &str,
    issues: &[QualityIssue],
    approach: StrategyApproach,
    max_negative_len: usize,
) -> PromptPlan {
    let has_content_mismatch = issues
        .iter()
        .any(|i| i.issue_type == IssueType::ContentMismatch);

    let mut prompt = if has_content_mismatch {
        format!("Show exactly this, and nothing else: {base_prompt}. The subject must be unmistakable")
    } else {
        base_prompt.to_string()
    };

    let mut additions: Vec<&str> = Vec::new();
    let mut negatives: Vec<&str> = NEGATIVE_BASELINE.to_vec();

    for issue in issues {
        let (clauses, negative_clauses) = clauses_for_issue(issue.issue_type);
        for clause in clauses {
            push_unique(&mut additions, clause, &prompt);
        }
        for clause in negative_clauses {
            push_unique(&mut negatives, clause, "");
        }
    }

    let (approach_clauses, approach_negatives) = clauses_for_approach(approach);
    for clause in approach_clauses {
        push_unique(&mut additions, clause, &prompt);
    }
    for clause in approach_negatives {
        push_unique(&mut negatives, clause, "");
    }

    if !additions.is_empty() {
        prompt.push_str(", ");
        prompt.push_str(&additions.join(", "));
    }

    let negative_prompt = truncate_at_word(&negatives.join(", "), max_negative_len);

    PromptPlan {
        prompt,
        negative_prompt,
    }
}

/// Fixed (prompt clauses, negative clauses) mapping per issue type.
fn clauses_for_issue(issue_type: IssueType) -> (&'static [&'static str], &'static [&'static str]) {
    match issue_type {
        IssueType::TextOverlap | IssueType::FaceBlocked => (
            &["leave clear space in the lower third, subject positioned in the upper frame"],
            &[],
        ),
        IssueType::PoorVisibility => (
            &["high-contrast lighting, clean uncluttered background"],
            &["dim lighting", "cluttered background"],
        ),
        IssueType::BadComposition | IssueType::WrongFraming => (
            &["balanced rule-of-thirds composition, subject at a comfortable distance"],
            &[],
        ),
        IssueType::Technical => (
            &["smooth stable footage, consistent motion"],
            &["flickering", "compression artifacts"],
        ),
        // Handled by the prefix rewrite; the clause reinforces it.
        IssueType::ContentMismatch => (&["clear unambiguous depiction of the subject"], &[]),
        IssueType::AiTextDetected => (
            &["absolutely no text, letters, or words anywhere in the frame"],
            &["letters", "words", "captions", "subtitles", "typography"],
        ),
        IssueType::AiUiDetected => (
            &["no screens, interfaces, or device displays"],
            &["user interface", "buttons", "menus", "screen overlays"],
        ),
        IssueType::OffBrandContent => (
            &["professional brand-safe imagery, neutral tasteful styling"],
            &["offensive content", "competitor branding"],
        ),
        IssueType::MissingBrandElement => (
            &["prominently feature the product as the hero of the frame"],
            &[],
        ),
        IssueType::MissingTextOverlay => (
            &["clean negative space reserved for a text overlay"],
            &[],
        ),
    }
}

/// Approach-specific reinforcement on top of the issue clauses.
fn clauses_for_approach(
    approach: StrategyApproach,
) -> (&'static [&'static str], &'static [&'static str]) {
    match approach {
        StrategyApproach::RegenerateWithEnhancedNegativePrompt => (
            &[],
            &["letters", "words", "captions", "subtitles", "typography", "written characters"],
        ),
        StrategyApproach::RegenerateWithContentRestrictions => (
            &[],
            &["user interface", "buttons", "menus", "screen overlays", "app windows"],
        ),
        StrategyApproach::RegenerateWithBrandGuidance => {
            (&["professional on-brand styling"], &[])
        }
        StrategyApproach::RegenerateWithReferenceImage => (
            &["match the composition, palette and style of the reference image"],
            &[],
        ),
        StrategyApproach::RegenerateWithCompositionFixes => (
            &["balanced rule-of-thirds composition, subject at a comfortable distance"],
            &[],
        ),
        StrategyApproach::RetrySame | StrategyApproach::StockFootage => (&[], &[]),
    }
}

/// Append `clause` only if it isn't already queued and isn't already part
/// of the prompt being extended.
fn push_unique<'a>(list: &mut Vec<&'a str>, clause: &'a str, existing: &str) {
    if !list.contains(&clause) && !existing.contains(clause) {
        list.push(clause);
    }
}

/// Truncate to `max_len` without splitting a word, trimming any trailing
/// separator left behind.
fn truncate_at_word(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let cut = s[..max_len]
        .rfind(|c: char| c == ' ' || c == ',')
        .unwrap_or(max_len);
    s[..cut].trim_end_matches([' ', ',']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelgen_models::Severity;

    const ALL_ISSUE_TYPES: &[IssueType] = &[
        IssueType::TextOverlap,
        IssueType::FaceBlocked,
        IssueType::PoorVisibility,
        IssueType::BadComposition,
        IssueType::Technical,
        IssueType::ContentMismatch,
        IssueType::AiTextDetected,
        IssueType::AiUiDetected,
        IssueType::OffBrandContent,
        IssueType::MissingBrandElement,
        IssueType::WrongFraming,
        IssueType::MissingTextOverlay,
    ];

    fn issue(issue_type: IssueType) -> QualityIssue {
        QualityIssue::new(issue_type, Severity::Major, "test issue", 0)
    }

    #[test]
    fn test_every_issue_type_extends_base_except_content_mismatch() {
        let base = "a steaming cup of coffee on a wooden table";
        for &issue_type in ALL_ISSUE_TYPES {
            let plan = synthesize(base, &[issue(issue_type)], StrategyApproach::RetrySame, 480);
            if issue_type == IssueType::ContentMismatch {
                assert!(!plan.prompt.starts_with(base), "{issue_type:?} should rewrite");
                assert!(plan.prompt.contains(base), "{issue_type:?} must keep the topic");
            } else {
                assert!(plan.prompt.starts_with(base), "{issue_type:?} must extend the base");
                assert!(plan.prompt.len() > base.len(), "{issue_type:?} must add a clause");
            }
        }
    }

    #[test]
    fn test_repeated_issues_are_deduplicated() {
        let base = "a runner at sunrise";
        let issues = vec![
            issue(IssueType::PoorVisibility),
            issue(IssueType::PoorVisibility),
            issue(IssueType::PoorVisibility),
        ];
        let once = synthesize(base, &issues[..1], StrategyApproach::RetrySame, 480);
        let thrice = synthesize(base, &issues, StrategyApproach::RetrySame, 480);
        assert_eq!(once.prompt, thrice.prompt);
        assert_eq!(once.negative_prompt, thrice.negative_prompt);
    }

    #[test]
    fn test_resynthesis_does_not_grow_unbounded() {
        // Feeding a synthesized prompt back in with the same issue must not
        // append the clause a second time.
        let base = "a runner at sunrise";
        let first = synthesize(base, &[issue(IssueType::PoorVisibility)], StrategyApproach::RetrySame, 480);
        let second = synthesize(
            &first.prompt,
            &[issue(IssueType::PoorVisibility)],
            StrategyApproach::RetrySame,
            480,
        );
        assert_eq!(first.prompt, second.prompt);
    }

    #[test]
    fn test_negative_baseline_always_present() {
        let plan = synthesize("anything", &[], StrategyApproach::RetrySame, 480);
        for term in ["blurry", "distorted", "watermark", "logo", "text", "amateur"] {
            assert!(plan.negative_prompt.contains(term), "missing baseline term {term}");
        }
    }

    #[test]
    fn test_ai_text_issue_strengthens_negatives() {
        let plan = synthesize(
            "a storefront",
            &[issue(IssueType::AiTextDetected)],
            StrategyApproach::RegenerateWithEnhancedNegativePrompt,
            480,
        );
        assert!(plan.negative_prompt.contains("captions"));
        assert!(plan.negative_prompt.contains("typography"));
        // Dedup across issue and approach clauses: "captions" appears once.
        assert_eq!(plan.negative_prompt.matches("captions").count(), 1);
    }

    #[test]
    fn test_negative_prompt_truncated_at_word_boundary() {
        let issues: Vec<QualityIssue> = ALL_ISSUE_TYPES.iter().map(|&t| issue(t)).collect();
        let plan = synthesize("base", &issues, StrategyApproach::RetrySame, 60);
        assert!(plan.negative_prompt.len() <= 60);
        assert!(!plan.negative_prompt.ends_with(','));
        assert!(!plan.negative_prompt.ends_with(' '));
        // The cut must land between terms, not inside one.
        let full = synthesize("base", &issues, StrategyApproach::RetrySame, 10_000).negative_prompt;
        assert!(full.starts_with(&plan.negative_prompt));
        let next = full.as_bytes()[plan.negative_prompt.len()];
        assert!(next == b',' || next == b' ');
    }

    #[test]
    fn test_reference_image_approach_adds_match_clause() {
        let plan = synthesize(
            "a product shot",
            &[],
            StrategyApproach::RegenerateWithReferenceImage,
            480,
        );
        assert!(plan.prompt.contains("reference image"));
    }
}
