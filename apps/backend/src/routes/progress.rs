//! Progress snapshot endpoints

use axum::{extract::State, Json};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/progress
pub async fn get(State(state): State<AppState>) -> Result<Json<ProgressSnapshot>> {
    let snapshot = state.progress.load().await?;
    Ok(Json(snapshot))
}

/// PUT /api/progress
pub async fn put(
    State(state): State<AppState>,
    Json(snapshot): Json<ProgressSnapshot>,
) -> Result<Json<ProgressSnapshot>> {
    state.progress.save(&snapshot).await?;
    Ok(Json(snapshot))
}
