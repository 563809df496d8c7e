//! Engine error types.

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Evaluator unavailable: {0}")]
    EvaluatorUnavailable(String),

    #[error("Evaluator response could not be parsed: {0}")]
    EvaluatorParse(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Generation timed out after {0} seconds")]
    GenerationTimeout(u64),

    #[error("Frame extraction failed: {0}")]
    FrameExtraction(String),

    #[error("Reanalysis failed: {0}")]
    Reanalysis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] reelgen_ledger::LedgerError),
}

impl EngineError {
    pub fn evaluator_unavailable(msg: impl Into<String>) -> Self {
        Self::EvaluatorUnavailable(msg.into())
    }

    pub fn evaluator_parse(msg: impl Into<String>) -> Self {
        Self::EvaluatorParse(msg.into())
    }

    pub fn generation_failed(msg: impl Into<String>) -> Self {
        Self::GenerationFailed(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for evaluator transport errors worth one transparent retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::EvaluatorUnavailable(_))
    }

    /// True for generation failures that must be recorded as failed
    /// attempts rather than propagated.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::GenerationFailed(_) | Self::GenerationTimeout(_))
    }
}
