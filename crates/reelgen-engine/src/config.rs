//! Engine configuration.

use std::time::Duration;

/// Regeneration engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum overall score for a scene to pass evaluation
    pub quality_threshold: u8,
    /// Attempts allowed per scene before recommending stock footage
    pub max_attempts: u32,
    /// How many history records to read when deciding a strategy
    pub history_limit: usize,
    /// Interval between generation status polls
    pub poll_interval: Duration,
    /// Total wall-clock budget for one generation call
    pub generation_timeout: Duration,
    /// Maximum negative prompt length accepted by providers
    pub max_negative_prompt_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quality_threshold: 70,
            max_attempts: 2,
            history_limit: 25,
            poll_interval: Duration::from_secs(5),
            generation_timeout: Duration::from_secs(300), // 5 minutes
            max_negative_prompt_len: 480,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            quality_threshold: std::env::var("REELGEN_QUALITY_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(70),
            max_attempts: std::env::var("REELGEN_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            history_limit: std::env::var("REELGEN_HISTORY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(25),
            poll_interval: Duration::from_secs(
                std::env::var("REELGEN_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            generation_timeout: Duration::from_secs(
                std::env::var("REELGEN_GENERATION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            max_negative_prompt_len: std::env::var("REELGEN_MAX_NEGATIVE_PROMPT_LEN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(480),
        }
    }
}
