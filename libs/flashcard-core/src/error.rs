//! Error types for flashcard-core.

use thiserror::Error;

/// Result type alias using QuizError.
pub type Result<T> = std::result::Result<T, QuizError>;

/// Failures of the audio pipeline.
///
/// Only [`AudioError::Backend`] is unexpected; the rest are ordinary
/// outcomes of probing for assets and are absorbed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("asset {path} not buffered within {timeout_ms}ms")]
    AssetLoadTimeout { path: String, timeout_ms: u64 },

    #[error("playback failed: {0}")]
    PlaybackFailed(String),

    #[error("speech synthesis unavailable")]
    SpeechCapabilityUnavailable,

    #[error("speech submission failed: {0}")]
    SpeechSubmissionFailed(String),

    #[error("audio backend error: {0}")]
    Backend(String),
}

impl AudioError {
    /// Whether the error only rules out one candidate file.
    pub fn is_candidate_miss(&self) -> bool {
        matches!(
            self,
            Self::AssetNotFound(_) | Self::AssetLoadTimeout { .. } | Self::PlaybackFailed(_)
        )
    }
}

/// Errors raised while loading the lexical corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("invalid corpus JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{category} item {index} has invalid unit {unit}")]
    InvalidUnit {
        category: &'static str,
        index: usize,
        unit: u32,
    },

    #[error("{category} item {index} has empty english text")]
    EmptyText { category: &'static str, index: usize },
}

/// Errors raised by question generation and test sessions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("not enough items to build a test (requested {requested})")]
    InsufficientCorpus { requested: usize },

    #[error("question position {position} out of range (test has {len})")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("answer kind does not match question {position}")]
    AnswerKindMismatch { position: usize },

    #[error("question {position} has no option {option}")]
    InvalidOption { position: usize, option: usize },

    #[error("no mistakes to retest")]
    NoMistakes,
}
