//! Study deck endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use flashcard_core::StudyDeck;
use tracing::debug;

use crate::error::Result;
use crate::models::*;
use crate::routes::parse_category;
use crate::AppState;

/// POST /api/study/{category}/pronounce
///
/// Reads every card of the deck aloud in deck order.
pub async fn pronounce(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<CorpusQuery>,
) -> Result<Json<QueueResponse>> {
    let category = parse_category(&category)?;
    let items = deck_pronunciation(StudyDeck::new(&state.corpus, category, query.unit));
    debug!(category = category.as_str(), cards = items.len(), "reading study deck");

    let started = state.engine.play_queue(&items).await;
    Ok(Json(QueueResponse { started }))
}

fn deck_pronunciation(mut deck: StudyDeck) -> Vec<QueueItem> {
    let mut items = Vec::with_capacity(deck.len());
    while let Some(item) = deck.pronunciation() {
        items.push(item);
        if !deck.next() {
            break;
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashcard_core::{Category, Corpus, UnitFilter};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deck_pronunciation_follows_deck_order() {
        let corpus = crate::services::corpus::bundled().unwrap();
        let deck = StudyDeck::new(&corpus, Category::Sentences, Some(1));
        let texts: Vec<String> = deck_pronunciation(deck)
            .into_iter()
            .map(|item| item.text)
            .collect();
        let expected: Vec<String> = corpus
            .filter_units(Category::Sentences, &UnitFilter::single(1))
            .into_iter()
            .map(|item| item.english.clone())
            .collect();
        assert!(!expected.is_empty());
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_empty_deck_reads_nothing() {
        let corpus = Corpus::default();
        let deck = StudyDeck::new(&corpus, Category::Phrases, None);
        assert!(deck_pronunciation(deck).is_empty());
    }
}
