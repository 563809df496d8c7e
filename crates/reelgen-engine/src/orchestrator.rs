//! The regeneration orchestrator.
//!
//! Drives one scene (and batches of scenes) through the full cycle:
//! analyze complexity, read the attempt ledger, decide a strategy,
//! synthesize prompts, run the generation with a bounded poll loop,
//! evaluate the fresh render, and append a full attempt record whatever
//! the outcome.
//!
//! Scenes in a batch are processed sequentially to respect the
//! per-project cost ceiling; each scene's history is owned by this single
//! writer for the duration of the call. Cancellation is honored between
//! scenes, never mid-generation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use metrics::counter;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use reelgen_ledger::AttemptLedger;
use reelgen_models::{
    AttemptResult, ProjectContext, Provider, QualityIssue, RegenerationAttempt,
    RegenerationResult, RegenerationStrategy, Scene, SceneQualityScore, StrategyApproach,
};

use crate::complexity;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::prompt;
use crate::providers::{
    FrameExtractor, GenerationRequest, GenerationStatus, SceneReanalyzer, VideoGenerator,
    VisionEvaluator,
};
use crate::scorer::QualityScorer;
use crate::strategy::{StrategyEngine, StrategyInput};

/// Output aspect ratio for short-form marketing scenes.
const ASPECT_RATIO: &str = "9:16";

/// A failing scene queued for regeneration, with the issues found in its
/// current render.
#[derive(Debug, Clone)]
pub struct FailedScene {
    pub scene: Scene,
    pub issues: Vec<QualityIssue>,
}

/// Orchestrates the regeneration cycle for scenes of a project.
pub struct RegenerationOrchestrator {
    config: EngineConfig,
    ledger: AttemptLedger,
    scorer: QualityScorer,
    strategy: StrategyEngine,
    generator: Arc<dyn VideoGenerator>,
    frame_extractor: Option<Arc<dyn FrameExtractor>>,
    reanalyzer: Option<Arc<dyn SceneReanalyzer>>,
    cancelled: AtomicBool,
}

impl RegenerationOrchestrator {
    /// Create an orchestrator with the required collaborators. Optional
    /// collaborators are attached with the `with_*` builders.
    pub fn new(config: EngineConfig, ledger: AttemptLedger, generator: Arc<dyn VideoGenerator>) -> Self {
        let strategy = StrategyEngine::new(config.max_attempts, config.max_negative_prompt_len);
        let scorer = QualityScorer::new(None, config.quality_threshold);
        Self {
            config,
            ledger,
            scorer,
            strategy,
            generator,
            frame_extractor: None,
            reanalyzer: None,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Attach a vision evaluator. Without one, every evaluation yields the
    /// conservative placeholder score.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn VisionEvaluator>) -> Self {
        self.scorer = QualityScorer::new(Some(evaluator), self.config.quality_threshold);
        self
    }

    /// Attach a frame extractor for evaluating fresh renders.
    pub fn with_frame_extractor(mut self, extractor: Arc<dyn FrameExtractor>) -> Self {
        self.frame_extractor = Some(extractor);
        self
    }

    /// Attach the downstream scene reanalyzer.
    pub fn with_reanalyzer(mut self, reanalyzer: Arc<dyn SceneReanalyzer>) -> Self {
        self.reanalyzer = Some(reanalyzer);
        self
    }

    /// Request cancellation of batch processing. Takes effect between
    /// scenes; an in-flight generation is allowed to finish.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Evaluate one representative frame of a scene.
    pub async fn evaluate_scene(&self, scene: &Scene, frame: &[u8]) -> SceneQualityScore {
        self.scorer.evaluate_scene(scene, frame).await
    }

    /// Full attempt history for a scene, most recent first.
    pub async fn scene_history(&self, scene_id: &str) -> EngineResult<Vec<RegenerationAttempt>> {
        Ok(self
            .ledger
            .get_attempts(scene_id, self.config.history_limit)
            .await?)
    }

    /// Run one regeneration cycle for a scene.
    ///
    /// Generation failures are recorded as failed attempts and surfaced in
    /// the result, never returned as errors; only ledger-read failures
    /// propagate.
    pub async fn regenerate_scene(
        &self,
        scene: &Scene,
        project: &ProjectContext,
        issues: &[QualityIssue],
    ) -> EngineResult<RegenerationResult> {
        let analysis = complexity::analyze(&scene.visual_direction);
        let prior = self
            .ledger
            .get_attempts(&scene.id, self.config.history_limit)
            .await?;
        let attempt_number = prior.len() as u32 + 1;

        let current_prompt = prior
            .first()
            .map(|a| a.prompt.as_str())
            .unwrap_or(&scene.visual_direction);

        let strategy = self.strategy.decide(StrategyInput {
            scene_id: &scene.id,
            prior_attempts: &prior,
            complexity: &analysis,
            current_prompt,
            original_prompt: &scene.visual_direction,
            current_media_url: scene.media_url.as_deref(),
            reference_url: project.brand_reference_url.as_deref(),
        });

        info!(
            scene_id = %scene.id,
            project_id = %project.id,
            attempt = attempt_number,
            approach = strategy.approach.as_str(),
            confidence = strategy.confidence,
            complexity = analysis.category.as_str(),
            "Computed regeneration strategy"
        );

        if strategy.approach.is_terminal() {
            return self
                .record_stock_recommendation(scene, project, attempt_number, &prior, strategy)
                .await;
        }

        let provider = strategy
            .changes
            .provider
            .or_else(|| prior.first().map(|a| a.provider))
            .unwrap_or_default();

        // Layer the freshly observed issues on top of the strategy's prompt.
        // Synthesis deduplicates against text already in the prompt, so this
        // never re-appends a clause the strategy merged in.
        let base_prompt = strategy.changes.prompt.as_deref().unwrap_or(current_prompt);
        let plan = prompt::synthesize(
            base_prompt,
            issues,
            strategy.approach,
            self.config.max_negative_prompt_len,
        );
        let final_prompt = plan.prompt;
        let duration_secs = scene.duration_secs.min(provider.max_duration_secs());

        let request = GenerationRequest {
            prompt: final_prompt.clone(),
            negative_prompt: plan.negative_prompt,
            duration_secs,
            aspect_ratio: ASPECT_RATIO.to_string(),
            provider,
            image_url: strategy.changes.reference_url.clone(),
        };

        match self.run_generation(&request).await {
            Ok(media_url) => {
                self.complete_attempt(
                    scene, project, attempt_number, provider, &strategy, final_prompt, media_url,
                    duration_secs,
                )
                .await
            }
            Err(e) => {
                counter!("reelgen_generation_failures_total").increment(1);
                warn!(
                    scene_id = %scene.id,
                    provider = %provider,
                    error = %e,
                    "Generation failed, recording failed attempt"
                );

                let record = RegenerationAttempt::new(
                    &scene.id,
                    &project.id,
                    attempt_number,
                    provider,
                    strategy.approach,
                    &final_prompt,
                    AttemptResult::Failure,
                )
                .with_decision(&strategy.reasoning, strategy.confidence);
                self.append_record(record).await;

                Ok(RegenerationResult {
                    scene_id: scene.id.clone(),
                    scene_index: scene.index,
                    attempt_number,
                    approach: strategy.approach,
                    provider: Some(provider),
                    success: false,
                    media_url: None,
                    quality: None,
                    error: Some(e.to_string()),
                    reasoning: strategy.reasoning,
                    confidence: strategy.confidence,
                })
            }
        }
    }

    /// Regenerate a batch of failing scenes within one video, sequentially.
    ///
    /// A bad scene never aborts the batch: every scene yields a structured
    /// result. Cancellation is checked before each scene.
    pub async fn regenerate_failed_scenes(
        &self,
        project: &ProjectContext,
        failed_scenes: &[FailedScene],
    ) -> Vec<RegenerationResult> {
        let mut results = Vec::with_capacity(failed_scenes.len());

        for failed in failed_scenes {
            if self.cancelled.load(Ordering::SeqCst) {
                warn!(
                    project_id = %project.id,
                    processed = results.len(),
                    remaining = failed_scenes.len() - results.len(),
                    "Batch regeneration cancelled between scenes"
                );
                break;
            }

            match self
                .regenerate_scene(&failed.scene, project, &failed.issues)
                .await
            {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(
                        scene_id = %failed.scene.id,
                        error = %e,
                        "Scene regeneration aborted by infrastructure error, continuing batch"
                    );
                    results.push(RegenerationResult {
                        scene_id: failed.scene.id.clone(),
                        scene_index: failed.scene.index,
                        attempt_number: 0,
                        approach: StrategyApproach::RetrySame,
                        provider: None,
                        success: false,
                        media_url: None,
                        quality: None,
                        error: Some(e.to_string()),
                        reasoning:
                            "Regeneration aborted before a strategy could be executed".to_string(),
                        confidence: 0.0,
                    });
                }
            }
        }

        results
    }

    /// Record a terminal stock-footage recommendation without calling any
    /// generation provider.
    async fn record_stock_recommendation(
        &self,
        scene: &Scene,
        project: &ProjectContext,
        attempt_number: u32,
        prior: &[RegenerationAttempt],
        strategy: RegenerationStrategy,
    ) -> EngineResult<RegenerationResult> {
        counter!("reelgen_stock_recommendations_total").increment(1);
        info!(
            scene_id = %scene.id,
            attempt = attempt_number,
            "Recommending stock footage, no generation performed"
        );

        let provider = prior.first().map(|a| a.provider).unwrap_or_default();
        let record = RegenerationAttempt::new(
            &scene.id,
            &project.id,
            attempt_number,
            provider,
            StrategyApproach::StockFootage,
            &scene.visual_direction,
            AttemptResult::Partial,
        )
        .with_decision(&strategy.reasoning, strategy.confidence);
        self.append_record(record).await;

        Ok(RegenerationResult {
            scene_id: scene.id.clone(),
            scene_index: scene.index,
            attempt_number,
            approach: StrategyApproach::StockFootage,
            provider: None,
            success: false,
            media_url: None,
            quality: None,
            error: None,
            reasoning: strategy.reasoning,
            confidence: strategy.confidence,
        })
    }

    /// Evaluate a fresh render, refresh downstream analysis, and record
    /// the attempt.
    #[allow(clippy::too_many_arguments)]
    async fn complete_attempt(
        &self,
        scene: &Scene,
        project: &ProjectContext,
        attempt_number: u32,
        provider: Provider,
        strategy: &RegenerationStrategy,
        final_prompt: String,
        media_url: String,
        duration_secs: f64,
    ) -> EngineResult<RegenerationResult> {
        counter!("reelgen_generations_total").increment(1);

        let quality = self
            .evaluate_fresh_render(scene, &media_url, duration_secs)
            .await;
        let (result, success) = match &quality {
            Some(q) if q.passes_threshold => (AttemptResult::Success, true),
            Some(_) => (AttemptResult::Partial, false),
            // No frame to judge; the next pipeline pass will evaluate.
            None => (AttemptResult::Success, true),
        };

        if let Some(reanalyzer) = &self.reanalyzer {
            if let Err(e) = reanalyzer.analyze(&media_url, scene).await {
                warn!(
                    scene_id = %scene.id,
                    error = %e,
                    "Scene reanalysis failed (non-fatal)"
                );
            }
        }

        let mut record = RegenerationAttempt::new(
            &scene.id,
            &project.id,
            attempt_number,
            provider,
            strategy.approach,
            &final_prompt,
            result,
        )
        .with_decision(&strategy.reasoning, strategy.confidence);
        if let Some(q) = &quality {
            record = record.with_quality(q.overall_score, q.issues.clone());
        }
        if strategy.changes.use_reference {
            record = record.with_reference_image();
        }
        self.append_record(record).await;

        info!(
            scene_id = %scene.id,
            attempt = attempt_number,
            provider = %provider,
            result = result.as_str(),
            overall = quality.as_ref().map(|q| q.overall_score),
            "Regeneration attempt complete"
        );

        Ok(RegenerationResult {
            scene_id: scene.id.clone(),
            scene_index: scene.index,
            attempt_number,
            approach: strategy.approach,
            provider: Some(provider),
            success,
            media_url: Some(media_url),
            quality,
            error: None,
            reasoning: strategy.reasoning.clone(),
            confidence: strategy.confidence,
        })
    }

    /// Sample a mid-clip frame of the new render and score it. `None` when
    /// no extractor is wired or the media cannot be sampled.
    async fn evaluate_fresh_render(
        &self,
        scene: &Scene,
        media_url: &str,
        duration_secs: f64,
    ) -> Option<SceneQualityScore> {
        let extractor = self.frame_extractor.as_ref()?;
        match extractor.extract_frame(media_url, duration_secs / 2.0).await {
            Ok(Some(frame)) => Some(self.scorer.evaluate_scene(scene, &frame).await),
            Ok(None) => {
                warn!(scene_id = %scene.id, "No frame extracted from fresh render, skipping evaluation");
                None
            }
            Err(e) => {
                warn!(scene_id = %scene.id, error = %e, "Frame extraction failed, skipping evaluation");
                None
            }
        }
    }

    /// Submit a generation task and poll it to completion within the
    /// configured wall-clock budget.
    async fn run_generation(&self, request: &GenerationRequest) -> EngineResult<String> {
        let job = self.generator.create(request).await?;
        let deadline = Instant::now() + self.config.generation_timeout;

        loop {
            match self.generator.poll(&job).await? {
                GenerationStatus::Complete { media_url } => return Ok(media_url),
                GenerationStatus::Failed { error } => {
                    return Err(EngineError::generation_failed(error));
                }
                GenerationStatus::Pending => {
                    if Instant::now() >= deadline {
                        return Err(EngineError::GenerationTimeout(
                            self.config.generation_timeout.as_secs(),
                        ));
                    }
                    sleep(self.config.poll_interval).await;
                }
            }
        }
    }

    /// Append an attempt record. Ledger write failures are logged and
    /// swallowed so bookkeeping trouble never loses a finished generation.
    async fn append_record(&self, record: RegenerationAttempt) {
        if let Err(e) = self.ledger.record_attempt(&record).await {
            warn!(
                scene_id = %record.scene_id,
                attempt = record.attempt_number,
                error = %e,
                "Failed to record regeneration attempt"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;
    use std::time::Duration;

    use reelgen_ledger::{AttemptStore, MemoryAttemptStore};
    use reelgen_models::{IssueType, Severity};

    use crate::providers::{EvaluationRequest, GenerationJobId};

    /// Generator fake: scripted outcome, records every request.
    struct FakeGenerator {
        requests: Mutex<Vec<GenerationRequest>>,
        polls_until_done: u32,
        polls_seen: AtomicU32,
        outcome: GenerationStatus,
        fail_create: bool,
    }

    impl FakeGenerator {
        fn succeeding() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                polls_until_done: 1,
                polls_seen: AtomicU32::new(0),
                outcome: GenerationStatus::Complete {
                    media_url: "https://cdn.example/render.mp4".to_string(),
                },
                fail_create: false,
            }
        }

        fn failing() -> Self {
            Self {
                outcome: GenerationStatus::Failed {
                    error: "provider rejected the prompt".to_string(),
                },
                ..Self::succeeding()
            }
        }

        fn never_finishing() -> Self {
            Self {
                polls_until_done: u32::MAX,
                ..Self::succeeding()
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_request(&self) -> GenerationRequest {
            self.requests.lock().unwrap().last().unwrap().clone()
        }
    }

    #[async_trait]
    impl VideoGenerator for FakeGenerator {
        async fn create(&self, request: &GenerationRequest) -> EngineResult<GenerationJobId> {
            if self.fail_create {
                return Err(EngineError::generation_failed("create refused"));
            }
            self.requests.lock().unwrap().push(request.clone());
            Ok(GenerationJobId("job-1".to_string()))
        }

        async fn poll(&self, _job: &GenerationJobId) -> EngineResult<GenerationStatus> {
            let seen = self.polls_seen.fetch_add(1, Ordering::SeqCst) + 1;
            if seen >= self.polls_until_done {
                Ok(self.outcome.clone())
            } else {
                Ok(GenerationStatus::Pending)
            }
        }
    }

    struct FakeExtractor;

    #[async_trait]
    impl FrameExtractor for FakeExtractor {
        async fn extract_frame(
            &self,
            _media_url: &str,
            _timestamp_secs: f64,
        ) -> EngineResult<Option<Vec<u8>>> {
            Ok(Some(vec![0u8; 16]))
        }
    }

    struct FakeEvaluator {
        payload: serde_json::Value,
    }

    #[async_trait]
    impl VisionEvaluator for FakeEvaluator {
        async fn evaluate(
            &self,
            _frame: &[u8],
            _request: &EvaluationRequest,
        ) -> EngineResult<serde_json::Value> {
            Ok(self.payload.clone())
        }
    }

    struct FakeReanalyzer {
        calls: AtomicU32,
    }

    #[async_trait]
    impl SceneReanalyzer for FakeReanalyzer {
        async fn analyze(&self, _media_url: &str, _scene: &Scene) -> EngineResult<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"shots": []}))
        }
    }

    fn passing_payload() -> serde_json::Value {
        json!({
            "scores": {
                "composition": 85, "visibility": 85, "technical_quality": 85,
                "content_match": 85, "professional_look": 85
            },
            "issues": []
        })
    }

    fn failing_payload() -> serde_json::Value {
        json!({
            "scores": {
                "composition": 40, "visibility": 40, "technical_quality": 40,
                "content_match": 40, "professional_look": 40
            },
            "issues": [
                {"type": "poor-visibility", "severity": "major", "description": "murky"}
            ]
        })
    }

    fn fast_config() -> EngineConfig {
        EngineConfig {
            poll_interval: Duration::from_millis(1),
            generation_timeout: Duration::from_millis(50),
            ..EngineConfig::default()
        }
    }

    fn scene() -> Scene {
        Scene::new("s1", 0, "product", 6.0, "a steaming cup of coffee")
    }

    fn project() -> ProjectContext {
        ProjectContext::new("p1")
    }

    struct Harness {
        orchestrator: RegenerationOrchestrator,
        store: Arc<MemoryAttemptStore>,
        generator: Arc<FakeGenerator>,
    }

    fn harness(generator: FakeGenerator, payload: serde_json::Value) -> Harness {
        let store = Arc::new(MemoryAttemptStore::new());
        let ledger = AttemptLedger::new(store.clone());
        let generator = Arc::new(generator);
        let orchestrator =
            RegenerationOrchestrator::new(fast_config(), ledger, generator.clone())
                .with_evaluator(Arc::new(FakeEvaluator { payload }))
                .with_frame_extractor(Arc::new(FakeExtractor));
        Harness {
            orchestrator,
            store,
            generator,
        }
    }

    #[tokio::test]
    async fn test_successful_regeneration_records_success() {
        let h = harness(FakeGenerator::succeeding(), passing_payload());

        let result = h
            .orchestrator
            .regenerate_scene(&scene(), &project(), &[])
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.attempt_number, 1);
        assert_eq!(result.media_url.as_deref(), Some("https://cdn.example/render.mp4"));
        assert_eq!(result.approach, StrategyApproach::RetrySame);

        let attempts = h.store.query("s1", 10).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].result, AttemptResult::Success);
        assert_eq!(attempts[0].quality_score, Some(85));
    }

    #[tokio::test]
    async fn test_render_below_threshold_is_partial() {
        let h = harness(FakeGenerator::succeeding(), failing_payload());

        let result = h
            .orchestrator
            .regenerate_scene(&scene(), &project(), &[])
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.media_url.is_some());
        assert!(result.error.is_none());

        let attempts = h.store.query("s1", 10).await.unwrap();
        assert_eq!(attempts[0].result, AttemptResult::Partial);
    }

    #[tokio::test]
    async fn test_generation_failure_is_recorded_not_propagated() {
        let h = harness(FakeGenerator::failing(), passing_payload());

        let result = h
            .orchestrator
            .regenerate_scene(&scene(), &project(), &[])
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("rejected"));

        let attempts = h.store.query("s1", 10).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].result, AttemptResult::Failure);
    }

    #[tokio::test]
    async fn test_generation_timeout_is_a_failed_attempt() {
        let h = harness(FakeGenerator::never_finishing(), passing_payload());

        let result = h
            .orchestrator
            .regenerate_scene(&scene(), &project(), &[])
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("timed out"));

        let attempts = h.store.query("s1", 10).await.unwrap();
        assert_eq!(attempts[0].result, AttemptResult::Failure);
    }

    #[tokio::test]
    async fn test_exhausted_budget_recommends_stock_without_generating() {
        // Scenario: three failures already recorded with a budget of two.
        let h = harness(FakeGenerator::succeeding(), passing_payload());
        for n in 1..=3 {
            let record = RegenerationAttempt::new(
                "s1",
                "p1",
                n,
                Provider::Runway,
                StrategyApproach::RetrySame,
                format!("prompt v{n}"),
                AttemptResult::Failure,
            );
            h.store.insert(&record).await.unwrap();
        }

        let result = h
            .orchestrator
            .regenerate_scene(&scene(), &project(), &[])
            .await
            .unwrap();

        assert_eq!(result.approach, StrategyApproach::StockFootage);
        assert!(!result.success);
        assert_eq!(result.attempt_number, 4);
        assert_eq!(h.generator.request_count(), 0);

        let attempts = h.store.query("s1", 10).await.unwrap();
        assert_eq!(attempts.len(), 4);
        assert_eq!(attempts[0].result, AttemptResult::Partial);
        assert_eq!(attempts[0].approach, StrategyApproach::StockFootage);
    }

    #[tokio::test]
    async fn test_impossible_direction_skips_generation() {
        let h = harness(FakeGenerator::succeeding(), passing_payload());
        let scene = Scene::new(
            "s1",
            0,
            "product",
            6.0,
            "hands kneading translucent pizza dough, twisting outward slowly",
        );

        let result = h
            .orchestrator
            .regenerate_scene(&scene, &project(), &[])
            .await
            .unwrap();

        assert_eq!(result.approach, StrategyApproach::StockFootage);
        assert!(result.confidence >= 0.8);
        assert_eq!(h.generator.request_count(), 0);
    }

    #[tokio::test]
    async fn test_reference_image_is_passed_to_the_generator() {
        let h = harness(FakeGenerator::succeeding(), passing_payload());
        // Complex but not impossible, and a brand reference exists.
        let scene = Scene::new("s1", 0, "product", 6.0, "hands pouring molten chocolate");
        let project = ProjectContext::new("p1")
            .with_reference_url("https://assets.example/brand.jpg");

        let result = h
            .orchestrator
            .regenerate_scene(&scene, &project, &[])
            .await
            .unwrap();

        assert_eq!(result.approach, StrategyApproach::RegenerateWithReferenceImage);
        let request = h.generator.last_request();
        assert_eq!(request.image_url.as_deref(), Some("https://assets.example/brand.jpg"));
        assert!(request.provider.supports_image_conditioning());

        let attempts = h.store.query("s1", 10).await.unwrap();
        assert!(attempts[0].used_reference_image);
    }

    #[tokio::test]
    async fn test_duration_bounded_by_provider_max() {
        let h = harness(FakeGenerator::succeeding(), passing_payload());
        let scene = Scene::new("s1", 0, "product", 30.0, "a city skyline at dusk");

        h.orchestrator
            .regenerate_scene(&scene, &project(), &[])
            .await
            .unwrap();

        let request = h.generator.last_request();
        assert!(request.duration_secs <= request.provider.max_duration_secs());
    }

    #[tokio::test]
    async fn test_issues_shape_the_prompt_and_negatives() {
        let h = harness(FakeGenerator::succeeding(), passing_payload());
        let issues = vec![QualityIssue::new(
            IssueType::PoorVisibility,
            Severity::Major,
            "murky lighting",
            0,
        )];

        h.orchestrator
            .regenerate_scene(&scene(), &project(), &issues)
            .await
            .unwrap();

        let request = h.generator.last_request();
        assert!(request.prompt.contains("high-contrast lighting"));
        assert!(request.negative_prompt.contains("dim lighting"));
        assert!(request.negative_prompt.contains("blurry"));
    }

    #[tokio::test]
    async fn test_batch_is_sequential_and_fault_isolated() {
        let h = harness(FakeGenerator::failing(), passing_payload());
        let failed = vec![
            FailedScene {
                scene: Scene::new("s1", 0, "product", 6.0, "a coffee cup"),
                issues: vec![],
            },
            FailedScene {
                scene: Scene::new("s2", 1, "lifestyle", 6.0, "a runner at sunrise"),
                issues: vec![],
            },
        ];

        let results = h
            .orchestrator
            .regenerate_failed_scenes(&project(), &failed)
            .await;

        // Both scenes produced structured results despite failures.
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.success));
        assert!(results.iter().all(|r| r.error.is_some()));
        assert_eq!(results[0].scene_id, "s1");
        assert_eq!(results[1].scene_id, "s2");
    }

    #[tokio::test]
    async fn test_cancellation_stops_between_scenes() {
        let h = harness(FakeGenerator::succeeding(), passing_payload());
        h.orchestrator.cancel();

        let failed = vec![FailedScene {
            scene: scene(),
            issues: vec![],
        }];
        let results = h
            .orchestrator
            .regenerate_failed_scenes(&project(), &failed)
            .await;

        assert!(results.is_empty());
        assert_eq!(h.generator.request_count(), 0);
    }

    #[tokio::test]
    async fn test_reanalyzer_runs_after_successful_generation() {
        let store = Arc::new(MemoryAttemptStore::new());
        let ledger = AttemptLedger::new(store.clone());
        let generator = Arc::new(FakeGenerator::succeeding());
        let reanalyzer = Arc::new(FakeReanalyzer {
            calls: AtomicU32::new(0),
        });
        let orchestrator =
            RegenerationOrchestrator::new(fast_config(), ledger, generator.clone())
                .with_evaluator(Arc::new(FakeEvaluator {
                    payload: passing_payload(),
                }))
                .with_frame_extractor(Arc::new(FakeExtractor))
                .with_reanalyzer(reanalyzer.clone());

        orchestrator
            .regenerate_scene(&scene(), &project(), &[])
            .await
            .unwrap();

        assert_eq!(reanalyzer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scene_history_most_recent_first() {
        let h = harness(FakeGenerator::failing(), passing_payload());

        h.orchestrator
            .regenerate_scene(&scene(), &project(), &[])
            .await
            .unwrap();
        h.orchestrator
            .regenerate_scene(&scene(), &project(), &[])
            .await
            .unwrap();

        let history = h.orchestrator.scene_history("s1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].attempt_number, 2);
        assert_eq!(history[1].attempt_number, 1);
    }
}
