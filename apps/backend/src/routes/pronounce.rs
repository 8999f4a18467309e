//! Pronunciation endpoints driving the audio engine

use axum::{extract::State, http::StatusCode, Json};
use flashcard_core::Category;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// POST /api/pronounce
pub async fn play(
    State(state): State<AppState>,
    Json(req): Json<PronounceRequest>,
) -> Result<Json<PronounceResponse>> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }

    let mut options = req.options;
    if options.key_words.is_empty() && req.category == Category::Sentences {
        // corpus sentences carry the words their recordings are named after
        if let Some(key_words) = state
            .corpus
            .items(Category::Sentences)
            .iter()
            .find(|item| item.english == req.text)
            .and_then(|item| item.key_words.clone())
        {
            options.key_words = key_words;
        }
    }

    let played = state.engine.play(&req.text, req.category, &options).await;
    Ok(Json(PronounceResponse { played }))
}

/// POST /api/pronounce/queue
///
/// Plays the items one after another and answers once the queue has ended.
/// A stop or another pronounce request cuts it short.
pub async fn queue(
    State(state): State<AppState>,
    Json(req): Json<QueueRequest>,
) -> Json<QueueResponse> {
    let started = state.engine.play_queue(&req.items).await;
    Json(QueueResponse { started })
}

/// POST /api/pronounce/stop
pub async fn stop(State(state): State<AppState>) -> StatusCode {
    state.engine.stop();
    StatusCode::NO_CONTENT
}

/// GET /api/pronounce/voices
pub async fn voices(State(state): State<AppState>) -> Json<VoicesResponse> {
    Json(VoicesResponse {
        voices: state.engine.list_voices(),
    })
}

/// GET /api/pronounce/cache
pub async fn cache(State(state): State<AppState>) -> Json<CacheInfo> {
    Json(state.engine.cache_info())
}

/// DELETE /api/pronounce/cache
pub async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    state.engine.clear_cache();
    StatusCode::NO_CONTENT
}
