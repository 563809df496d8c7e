//! Heuristic complexity analysis of visual direction prompts.
//!
//! Current video generators reliably fail on a few well-known prompt
//! families: precise hand-object interaction, translucent or liquid
//! materials, and tightly specified motion. This module scores those
//! factors from keyword lexicons, producing a deterministic
//! [`ComplexityAnalysis`] with no side effects. Unmatched text scores 0.0
//! and categorizes as simple.

use std::collections::HashSet;

use reelgen_models::{
    ComplexityAnalysis, ComplexityBreakdown, ComplexityCategory, FactorRating, Provider,
};

/// Specific physical actions that generators struggle to articulate.
const ACTION_TERMS: &[&str] = &[
    "kneading", "knead", "folding", "fold", "pouring", "pour", "slicing", "slice", "chopping",
    "chop", "twisting", "twist", "stirring", "stir", "whisking", "whisk", "squeezing", "squeeze",
    "gripping", "grasping", "tying", "peeling", "braiding", "typing", "writing", "threading",
];

/// Hand and finger references; combined with an action they rate very-hard.
const HAND_TERMS: &[&str] = &[
    "hand", "hands", "finger", "fingers", "fingertips", "palm", "palms", "thumb", "fist", "knuckles",
];

/// Material properties implying translucency, liquidity or reflectivity.
const MATERIAL_VERY_HARD_TERMS: &[&str] = &[
    "translucent", "transparent", "glassy", "liquid", "molten", "dripping", "flowing", "splashing",
    "reflective", "mirrored", "glossy", "iridescent", "shimmering", "bubbling",
];

/// Other tricky material properties.
const MATERIAL_HARD_TERMS: &[&str] = &[
    "stretchy", "elastic", "sticky", "foamy", "powdery", "crumbly", "fuzzy", "furry", "woven",
];

/// Direction words indicating precise motion.
const DIRECTION_TERMS: &[&str] = &[
    "outward", "inward", "upward", "downward", "sideways", "clockwise", "counterclockwise",
    "leftward", "rightward",
];

/// Pace modifiers; a direction plus a pace rates very-hard.
const PACE_TERMS: &[&str] = &[
    "slowly", "quickly", "gradually", "rapidly", "gently", "steadily", "precisely", "smoothly",
];

/// Domain-specific nouns generators tend to mangle.
const DOMAIN_TERMS: &[&str] = &[
    "pizza", "dough", "espresso", "latte", "cappuccino", "croissant", "sourdough", "pastry",
    "sushi", "ramen", "cocktail", "barista", "barbell", "dumbbell", "kettlebell", "treadmill",
    "stethoscope", "syringe", "scalpel", "soldering", "circuitry", "gearbox", "carburetor",
];

/// Temporal-sequence words implying multi-step choreography.
const TEMPORAL_TERMS: &[&str] = &["then", "while", "after", "before", "finally", "meanwhile"];

// Factor weights in hundredths, so threshold comparisons stay exact.
const WEIGHT_ACTION: u32 = 20;
const WEIGHT_ACTION_WITH_HANDS: u32 = 35;
const WEIGHT_MATERIAL_HARD: u32 = 15;
const WEIGHT_MATERIAL_VERY_HARD: u32 = 30;
const WEIGHT_MOTION_DIRECTION: u32 = 10;
const WEIGHT_MOTION_PRECISE: u32 = 25;
const WEIGHT_PER_DOMAIN_TERM: u32 = 5;
const WEIGHT_DOMAIN_CAP: u32 = 15;
const WEIGHT_TEMPORAL: u32 = 10;

/// Analyze the difficulty of a visual direction.
///
/// Pure and deterministic: identical input always produces an identical
/// analysis, and the score is clamped to [0, 1].
pub fn analyze(text: &str) -> ComplexityAnalysis {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return ComplexityAnalysis::simple();
    }

    let has_action = matches_any(&tokens, ACTION_TERMS);
    let has_hands = matches_any(&tokens, HAND_TERMS);
    let specific_action = match (has_action, has_hands) {
        (true, true) => FactorRating::VeryHard,
        (true, false) => FactorRating::Hard,
        _ => FactorRating::NotPresent,
    };

    let material_properties = if matches_any(&tokens, MATERIAL_VERY_HARD_TERMS) {
        FactorRating::VeryHard
    } else if matches_any(&tokens, MATERIAL_HARD_TERMS) {
        FactorRating::Hard
    } else {
        FactorRating::NotPresent
    };

    let has_direction = matches_any(&tokens, DIRECTION_TERMS);
    let has_pace = matches_any(&tokens, PACE_TERMS);
    let motion = match (has_direction, has_pace) {
        (true, true) => FactorRating::VeryHard,
        (true, false) => FactorRating::Hard,
        _ => FactorRating::NotPresent,
    };

    let domain_terms = DOMAIN_TERMS
        .iter()
        .filter(|t| tokens.contains(**t))
        .count() as u32;
    let temporal_sequence = matches_any(&tokens, TEMPORAL_TERMS);

    let mut weight: u32 = 0;
    weight += match specific_action {
        FactorRating::VeryHard => WEIGHT_ACTION_WITH_HANDS,
        FactorRating::Hard => WEIGHT_ACTION,
        FactorRating::NotPresent => 0,
    };
    weight += match material_properties {
        FactorRating::VeryHard => WEIGHT_MATERIAL_VERY_HARD,
        FactorRating::Hard => WEIGHT_MATERIAL_HARD,
        FactorRating::NotPresent => 0,
    };
    weight += match motion {
        FactorRating::VeryHard => WEIGHT_MOTION_PRECISE,
        FactorRating::Hard => WEIGHT_MOTION_DIRECTION,
        FactorRating::NotPresent => 0,
    };
    weight += (domain_terms * WEIGHT_PER_DOMAIN_TERM).min(WEIGHT_DOMAIN_CAP);
    if temporal_sequence {
        weight += WEIGHT_TEMPORAL;
    }

    let score = (weight.min(100)) as f64 / 100.0;
    let category = ComplexityCategory::from_score(score);

    let breakdown = ComplexityBreakdown {
        specific_action,
        material_properties,
        motion,
        domain_terms,
        temporal_sequence,
    };

    let (recommended_providers, avoid_providers) = provider_recommendations(category);
    let suggest_reference_image = category >= ComplexityCategory::Complex
        && (specific_action == FactorRating::VeryHard
            || material_properties == FactorRating::VeryHard);

    let (simplified_prompt, warning) = if category >= ComplexityCategory::Complex {
        (Some(simplify(text)), Some(build_warning(&breakdown, category)))
    } else {
        (None, None)
    };

    ComplexityAnalysis {
        score,
        category,
        breakdown,
        recommended_providers,
        avoid_providers,
        suggest_reference_image,
        simplified_prompt,
        warning,
    }
}

/// Lowercased word set of the input.
fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

fn matches_any(tokens: &HashSet<String>, terms: &[&str]) -> bool {
    terms.iter().any(|t| tokens.contains(*t))
}

fn provider_recommendations(category: ComplexityCategory) -> (Vec<Provider>, Vec<Provider>) {
    match category {
        ComplexityCategory::Simple => (vec![Provider::Pika, Provider::Runway], vec![]),
        ComplexityCategory::Moderate => (vec![Provider::Runway, Provider::Luma], vec![]),
        ComplexityCategory::Complex | ComplexityCategory::Impossible => {
            (vec![Provider::Runway, Provider::Luma], vec![Provider::Pika])
        }
    }
}

/// Strip the material and motion tokens that drove the difficulty up,
/// keeping the rest of the direction intact.
fn simplify(text: &str) -> String {
    let strip: HashSet<&str> = MATERIAL_VERY_HARD_TERMS
        .iter()
        .chain(MATERIAL_HARD_TERMS)
        .chain(DIRECTION_TERMS)
        .chain(PACE_TERMS)
        .copied()
        .collect();

    text.split_whitespace()
        .filter(|word| {
            let normalized: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            !strip.contains(normalized.as_str())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_warning(breakdown: &ComplexityBreakdown, category: ComplexityCategory) -> String {
    let mut reasons = Vec::new();
    if breakdown.specific_action == FactorRating::VeryHard {
        reasons.push("precise hand-object interaction");
    } else if breakdown.specific_action == FactorRating::Hard {
        reasons.push("a specific physical action");
    }
    if breakdown.material_properties == FactorRating::VeryHard {
        reasons.push("translucent, liquid or reflective materials");
    } else if breakdown.material_properties == FactorRating::Hard {
        reasons.push("difficult material properties");
    }
    if breakdown.motion != FactorRating::NotPresent {
        reasons.push("tightly specified motion");
    }
    if breakdown.temporal_sequence {
        reasons.push("a multi-step temporal sequence");
    }

    format!(
        "This direction is rated {} for current video generators: it requires {}. Expect artifacts; consider the simplified prompt or a reference image.",
        category.as_str(),
        reasons.join(" and ")
    )
}
