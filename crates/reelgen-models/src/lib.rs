//! Shared data models for the ReelGen regeneration backend.
//!
//! This crate provides Serde-serializable types for:
//! - Scenes and project context
//! - Quality scores and classified quality issues
//! - Regeneration attempts and their outcomes
//! - Prompt complexity analysis
//! - Regeneration strategies and per-scene results

pub mod attempt;
pub mod complexity;
pub mod provider;
pub mod quality;
pub mod scene;
pub mod strategy;

// Re-export common types
pub use attempt::{AttemptResult, RegenerationAttempt};
pub use complexity::{
    ComplexityAnalysis, ComplexityBreakdown, ComplexityCategory, FactorRating,
};
pub use provider::Provider;
pub use quality::{IssueType, QualityIssue, SceneQualityScore, Severity, SubScores};
pub use scene::{ProjectContext, Scene};
pub use strategy::{
    RegenerationResult, RegenerationStrategy, StrategyApproach, StrategyChanges,
};
