//! Generation provider identifiers and capabilities.
//!
//! The HTTP clients behind these identifiers live outside this core; the
//! enum only carries the capability facts the strategy and orchestrator
//! need (image conditioning support, maximum clip length).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A video generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Primary text-to-video provider, supports image conditioning
    #[default]
    Runway,
    /// Fast, cheap provider for simple scenes; text-to-video only
    Pika,
    /// Secondary provider with image conditioning support
    Luma,
}

impl Provider {
    /// Returns the provider as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Runway => "runway",
            Self::Pika => "pika",
            Self::Luma => "luma",
        }
    }

    /// Whether the provider accepts a reference image to condition generation.
    pub fn supports_image_conditioning(&self) -> bool {
        match self {
            Self::Runway | Self::Luma => true,
            Self::Pika => false,
        }
    }

    /// Maximum clip duration the provider will render, in seconds.
    pub fn max_duration_secs(&self) -> f64 {
        match self {
            Self::Runway => 10.0,
            Self::Pika => 4.0,
            Self::Luma => 5.0,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_conditioning_capability() {
        assert!(Provider::Runway.supports_image_conditioning());
        assert!(Provider::Luma.supports_image_conditioning());
        assert!(!Provider::Pika.supports_image_conditioning());
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Provider::Pika).unwrap();
        assert_eq!(json, "\"pika\"");
        let parsed: Provider = serde_json::from_str("\"luma\"").unwrap();
        assert_eq!(parsed, Provider::Luma);
    }
}
