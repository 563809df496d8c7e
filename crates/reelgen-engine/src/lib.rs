//! Adaptive regeneration engine for AI-generated video scenes.
//!
//! This crate provides:
//! - Complexity analysis of visual direction prompts
//! - Quality scoring via an injected vision evaluator
//! - A pure strategy engine deciding the next action for a failing scene
//! - Prompt synthesis from classified quality issues
//! - The orchestrator driving scenes through the full regeneration cycle
//!
//! The engine performs no media synthesis or vision inference itself: the
//! generation provider, vision evaluator, frame extractor and scene
//! reanalyzer are injected collaborators (see [`providers`]).

pub mod complexity;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod retry;
pub mod scorer;
pub mod strategy;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use orchestrator::{FailedScene, RegenerationOrchestrator};
pub use prompt::{synthesize, PromptPlan};
pub use providers::{
    EvaluationRequest, FrameExtractor, GenerationJobId, GenerationRequest, GenerationStatus,
    RawEvaluation, SceneReanalyzer, VideoGenerator, VisionEvaluator,
};
pub use scorer::QualityScorer;
pub use strategy::{StrategyEngine, StrategyInput};
