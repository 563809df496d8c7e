//! Injected collaborator contracts.
//!
//! The engine never talks to a provider API directly. Each external
//! capability (vision evaluation, video generation, frame extraction,
//! scene reanalysis) is an object-safe async trait, so production wires in
//! real HTTP clients and tests wire in deterministic fakes.
//!
//! Client handles implementing these traits are built once per process and
//! shared by reference; the engine holds `Arc`s and never constructs them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use reelgen_models::{Provider, Scene};

use crate::error::EngineResult;

/// Structured request sent to the vision evaluator alongside a frame.
///
/// Built deterministically from scene context: the same scene always
/// produces the same request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationRequest {
    pub scene_id: String,
    pub scene_index: u32,
    pub scene_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
    pub visual_direction: String,
    pub expected_overlays: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_framing: Option<String>,
}

impl EvaluationRequest {
    /// Build the request for a scene.
    pub fn for_scene(scene: &Scene) -> Self {
        Self {
            scene_id: scene.id.clone(),
            scene_index: scene.index,
            scene_type: scene.scene_type.clone(),
            narration: scene.narration.clone(),
            visual_direction: scene.visual_direction.clone(),
            expected_overlays: scene.expected_overlays.clone(),
            expected_framing: scene.expected_framing.clone(),
        }
    }
}

/// Sub-scores as returned by the evaluator; any field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawScores {
    pub composition: Option<f64>,
    pub visibility: Option<f64>,
    pub technical_quality: Option<f64>,
    pub content_match: Option<f64>,
    pub professional_look: Option<f64>,
}

/// One issue entry as returned by the evaluator. Fields are loose strings
/// so a sloppy payload degrades to dropped entries instead of a failed
/// evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawIssue {
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
}

/// The evaluator's response schema before defensive normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvaluation {
    #[serde(default)]
    pub scores: RawScores,
    #[serde(default)]
    pub issues: Vec<RawIssue>,
}

/// External vision evaluation collaborator.
#[async_trait]
pub trait VisionEvaluator: Send + Sync {
    /// Judge one frame against the scene context. Returns the raw JSON
    /// payload; the quality scorer performs all normalization.
    async fn evaluate(
        &self,
        frame: &[u8],
        request: &EvaluationRequest,
    ) -> EngineResult<serde_json::Value>;
}

/// Request for one video generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub duration_secs: f64,
    pub aspect_ratio: String,
    pub provider: Provider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Handle for a long-running generation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJobId(pub String);

/// Status of a polled generation task.
#[derive(Debug, Clone)]
pub enum GenerationStatus {
    /// Still rendering
    Pending,
    /// Finished; the rendered media is available
    Complete { media_url: String },
    /// The provider reported a failure
    Failed { error: String },
}

/// External video generation collaborator. Generation is long-running, so
/// the contract is create-task/poll-status; the orchestrator owns the
/// bounded wait.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Submit a generation task.
    async fn create(&self, request: &GenerationRequest) -> EngineResult<GenerationJobId>;

    /// Poll a previously created task.
    async fn poll(&self, job: &GenerationJobId) -> EngineResult<GenerationStatus>;
}

/// External frame extraction collaborator (ffmpeg or similar behind it).
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Extract one frame at the given timestamp. `None` means the media
    /// could not be sampled; callers treat that as "skip evaluation".
    async fn extract_frame(
        &self,
        media_url: &str,
        timestamp_secs: f64,
    ) -> EngineResult<Option<Vec<u8>>>;
}

/// External scene reanalysis collaborator. The result is opaque to this
/// core and passed through to downstream composition.
#[async_trait]
pub trait SceneReanalyzer: Send + Sync {
    async fn analyze(&self, media_url: &str, scene: &Scene) -> EngineResult<serde_json::Value>;
}
