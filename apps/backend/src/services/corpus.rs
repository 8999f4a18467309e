//! Corpus loading at startup.

use std::path::Path;

use flashcard_core::Corpus;

use crate::error::Result;

/// Corpus shipped with the service.
const BUNDLED_CORPUS: &str = include_str!("../../data/corpus.json");

/// Load the corpus from `path`, or the bundled one when `None`.
pub async fn load(path: Option<&Path>) -> Result<Corpus> {
    let corpus = match path {
        Some(path) => {
            let content = tokio::fs::read_to_string(path).await?;
            Corpus::from_json(&content)?
        }
        None => bundled()?,
    };

    tracing::info!(
        vocabulary = corpus.vocabulary.len(),
        phrases = corpus.phrases.len(),
        sentences = corpus.sentences.len(),
        "corpus loaded"
    );
    Ok(corpus)
}

pub fn bundled() -> Result<Corpus> {
    Ok(Corpus::from_json(BUNDLED_CORPUS)?)
}
