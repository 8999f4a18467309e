//! Test fixtures and factory functions for creating test data.

use serde_json::{json, Value};

use vocab_flashcards_backend::models::Voice;

/// Stand-in bytes for a recording.
pub const MP3_BYTES: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00";

/// Sentence whose recording is named after its key words.
pub const KEYWORD_SENTENCE: &str = "Only drink clean water!";

pub fn voice(name: &str, lang: &str) -> Voice {
    Voice {
        name: name.to_string(),
        lang: lang.to_string(),
        is_local: true,
    }
}

/// Body for POST /api/tests.
pub fn create_test_request(category: &str, units: &[u32], count: Option<usize>) -> Value {
    json!({
        "category": category,
        "units": units,
        "count": count,
    })
}

/// Body for POST /api/pronounce.
pub fn pronounce_request(text: &str, category: &str) -> Value {
    json!({
        "text": text,
        "category": category,
    })
}

/// Body for POST /api/pronounce/queue from `(text, category)` pairs.
pub fn queue_request(items: &[(&str, &str)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(text, category)| pronounce_request(text, category))
        .collect();
    json!({ "items": items })
}

/// Index of the correct option of a choice question.
pub fn correct_option(question: &Value) -> usize {
    question["options"]
        .as_array()
        .expect("choice question has options")
        .iter()
        .position(|option| option["is_correct"] == true)
        .expect("choice question has a correct option")
}

/// Index of some wrong option of a choice question.
pub fn wrong_option(question: &Value) -> Option<usize> {
    question["options"]
        .as_array()?
        .iter()
        .position(|option| option["is_correct"] == false)
}
