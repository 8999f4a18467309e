//! Corpus endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use flashcard_core::UnitFilter;

use crate::error::Result;
use crate::models::*;
use crate::routes::parse_category;
use crate::AppState;

/// GET /api/corpus/{category}
pub async fn list(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<CorpusQuery>,
) -> Result<Json<CorpusResponse>> {
    let category = parse_category(&category)?;
    let filter = query.unit.map_or(UnitFilter::All, UnitFilter::single);
    let items = state
        .corpus
        .filter_units(category, &filter)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(CorpusResponse {
        category,
        unit: query.unit,
        items,
    }))
}

/// GET /api/corpus/{category}/units
pub async fn units(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<UnitsResponse>> {
    let category = parse_category(&category)?;
    Ok(Json(UnitsResponse {
        category,
        units: state.corpus.units(category),
    }))
}
