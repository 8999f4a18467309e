//! Audio filename resolution endpoint

use axum::{
    extract::{Path, Query, State},
    Json,
};
use flashcard_core::audio::resolver;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::{parse_category, AUDIO_ROUTE};
use crate::AppState;

/// GET /api/audio/{category}/candidates
///
/// Candidate asset URLs for a text, in the order a player should try them.
pub async fn candidates(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<CandidatesQuery>,
) -> Result<Json<CandidatesResponse>> {
    let category = parse_category(&category)?;
    if query.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }

    let options = PlayOptions::with_key_words(query.key_words());
    let asset = state.engine.asset_ref(&query.text, category, &options);
    let candidates = asset
        .candidate_filenames
        .iter()
        .map(|filename| resolver::asset_path(AUDIO_ROUTE, category, filename))
        .collect();

    Ok(Json(CandidatesResponse {
        filenames: asset.candidate_filenames,
        candidates,
    }))
}
