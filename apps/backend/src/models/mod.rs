//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export shared types from flashcard-core
pub use flashcard_core::audio::{CacheInfo, PlayOptions, QueueItem, Voice};
pub use flashcard_core::quiz::{AnswerReview, ScoreReport};
pub use flashcard_core::study::ProgressSnapshot;
pub use flashcard_core::types::{Category, LexicalItem, Question, QuestionType, UserAnswer};

use flashcard_core::TestSession;

// === Corpus ===

/// Query for GET /api/corpus/{category}
#[derive(Debug, Default, Deserialize)]
pub struct CorpusQuery {
    pub unit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CorpusResponse {
    pub category: Category,
    pub unit: Option<u32>,
    pub items: Vec<LexicalItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnitsResponse {
    pub category: Category,
    pub units: Vec<u32>,
}

// === Audio ===

/// Query for GET /api/audio/{category}/candidates
#[derive(Debug, Deserialize)]
pub struct CandidatesQuery {
    pub text: String,
    /// Comma separated.
    pub key_words: Option<String>,
}

impl CandidatesQuery {
    pub fn key_words(&self) -> Vec<String> {
        self.key_words
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|word| !word.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CandidatesResponse {
    pub filenames: Vec<String>,
    /// URL paths under `/audio`, in try order.
    pub candidates: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PronounceRequest {
    pub text: String,
    pub category: Category,
    #[serde(default)]
    pub options: PlayOptions,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PronounceResponse {
    pub played: bool,
}

/// Request for POST /api/pronounce/queue
#[derive(Debug, Deserialize)]
pub struct QueueRequest {
    pub items: Vec<QueueItem>,
}

/// How many queued items started playing before the queue ended.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueueResponse {
    pub started: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoicesResponse {
    pub voices: Vec<Voice>,
}

// === Tests ===

/// Request for POST /api/tests
#[derive(Debug, Deserialize)]
pub struct CreateTestRequest {
    pub category: Category,
    /// Empty means every unit.
    #[serde(default)]
    pub units: Vec<u32>,
    pub question_type: Option<QuestionType>,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: UserAnswer,
}

/// A test session as the client sees it.
#[derive(Debug, Serialize, Deserialize)]
pub struct TestSessionResponse {
    pub id: Uuid,
    pub category: Category,
    pub question_type: QuestionType,
    pub questions: Vec<Question>,
    pub answers: Vec<Option<UserAnswer>>,
    pub current_index: usize,
    pub answered_count: usize,
    pub started_at: DateTime<Utc>,
}

impl TestSessionResponse {
    pub fn new(
        id: Uuid,
        category: Category,
        question_type: QuestionType,
        session: &TestSession,
    ) -> Self {
        Self {
            id,
            category,
            question_type,
            questions: session.questions().to_vec(),
            answers: session.answers().to_vec(),
            current_index: session.current_index(),
            answered_count: session.answered_count(),
            started_at: session.started_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResponse {
    #[serde(flatten)]
    pub score: ScoreReport,
    pub elapsed_seconds: i64,
    pub review: Vec<AnswerReview>,
}
