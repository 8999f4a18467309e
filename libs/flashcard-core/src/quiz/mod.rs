//! Quiz generation, scoring and test sessions.

pub mod generator;
pub mod scoring;
pub mod session;

pub use generator::{generate, tokenize_sentence, GeneratorConfig, QuestionGenerator};
pub use scoring::{is_correct, mistake_subset, review, score, AnswerReview, ScoreReport};
pub use session::{
    clamp_question_count, TestSession, DEFAULT_MAX_QUESTIONS, DEFAULT_MIN_QUESTIONS,
};
