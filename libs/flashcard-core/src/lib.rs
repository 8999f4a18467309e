//! Core library of the vocabulary flashcard application.
//!
//! Provides:
//! - Lexical corpus model with unit filtering
//! - Audio filename resolution and the pronunciation playback engine
//!   (recorded assets with a synthetic speech fallback)
//! - Quiz question generation, scoring and test sessions
//! - Flashcard study deck and progress snapshot
//! - Shared types (LexicalItem, Question, UserAnswer, etc.)

pub mod audio;
pub mod corpus;
pub mod error;
pub mod quiz;
pub mod study;
pub mod types;

pub use audio::{
    AssetBackend, AssetHandle, AssetRef, AudioConfig, AudioEngine, CacheInfo, PlayOptions,
    PlaybackEnd, QueueItem, ResolutionMode, SpeechOptions, SpeechSynthesizer, Utterance,
    UtteranceObserver, Voice,
};
pub use corpus::{Corpus, UnitFilter};
pub use error::{AudioError, CorpusError, QuizError, Result};
pub use quiz::{AnswerReview, GeneratorConfig, QuestionGenerator, ScoreReport, TestSession};
pub use study::{ProgressSnapshot, StudyDeck, StudyStats};
pub use types::{
    Category, Difficulty, LexicalItem, Question, QuestionOption, QuestionType, UserAnswer,
};
