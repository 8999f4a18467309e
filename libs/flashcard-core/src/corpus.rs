//! Static lexical corpus grouped by category.
//!
//! # Format
//! ```json
//! {
//!   "vocabulary": [{ "english": "near", "chinese": "在...附近", "unit": 1 }],
//!   "phrases": [],
//!   "sentences": [{ "english": "...", "chinese": "...", "unit": 1, "keyWords": ["..."] }]
//! }
//! ```

use crate::error::CorpusError;
use crate::types::{Category, LexicalItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Read-only table of lexical items loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub vocabulary: Vec<LexicalItem>,
    #[serde(default)]
    pub phrases: Vec<LexicalItem>,
    #[serde(default)]
    pub sentences: Vec<LexicalItem>,
}

/// Which units a view or test draws from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitFilter {
    All,
    Units(BTreeSet<u32>),
}

impl Default for UnitFilter {
    fn default() -> Self {
        Self::All
    }
}

impl UnitFilter {
    pub fn single(unit: u32) -> Self {
        Self::Units(BTreeSet::from([unit]))
    }

    pub fn matches(&self, unit: u32) -> bool {
        match self {
            Self::All => true,
            Self::Units(units) => units.contains(&unit),
        }
    }
}

impl Corpus {
    /// Parse and validate a corpus from JSON.
    pub fn from_json(content: &str) -> Result<Self, CorpusError> {
        let corpus: Corpus = serde_json::from_str(content)?;
        corpus.validate()?;
        Ok(corpus)
    }

    fn validate(&self) -> Result<(), CorpusError> {
        for category in Category::ALL {
            for (index, item) in self.items(category).iter().enumerate() {
                if item.unit < 1 {
                    return Err(CorpusError::InvalidUnit {
                        category: category.as_str(),
                        index,
                        unit: item.unit,
                    });
                }
                if item.english.trim().is_empty() {
                    return Err(CorpusError::EmptyText {
                        category: category.as_str(),
                        index,
                    });
                }
            }
        }
        Ok(())
    }

    /// All items of a category, in corpus order.
    pub fn items(&self, category: Category) -> &[LexicalItem] {
        match category {
            Category::Vocabulary => &self.vocabulary,
            Category::Phrases => &self.phrases,
            Category::Sentences => &self.sentences,
        }
    }

    /// Sorted, distinct units present in a category.
    pub fn units(&self, category: Category) -> Vec<u32> {
        self.items(category)
            .iter()
            .map(|item| item.unit)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Items of a category whose unit passes the filter, in corpus order.
    pub fn filter_units(&self, category: Category, filter: &UnitFilter) -> Vec<&LexicalItem> {
        self.items(category)
            .iter()
            .filter(|item| filter.matches(item.unit))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len() + self.phrases.len() + self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "vocabulary": [
            { "english": "near", "chinese": "在...附近", "unit": 1 },
            { "english": "town", "chinese": "城镇", "unit": 2 },
            { "english": "along", "chinese": "沿着", "unit": 1 }
        ],
        "sentences": [
            { "english": "Only drink clean water!", "chinese": "只喝干净的水！", "unit": 10,
              "keyWords": ["drink", "clean", "water"] }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let corpus = Corpus::from_json(SAMPLE).unwrap();
        assert_eq!(corpus.len(), 4);
        assert!(corpus.items(Category::Phrases).is_empty());
        assert_eq!(
            corpus.sentences[0].key_words.as_deref(),
            Some(&["drink".to_string(), "clean".to_string(), "water".to_string()][..])
        );
    }

    #[test]
    fn test_units_sorted_and_distinct() {
        let corpus = Corpus::from_json(SAMPLE).unwrap();
        assert_eq!(corpus.units(Category::Vocabulary), vec![1, 2]);
        assert_eq!(corpus.units(Category::Phrases), Vec::<u32>::new());
    }

    #[test]
    fn test_filter_units() {
        let corpus = Corpus::from_json(SAMPLE).unwrap();
        let unit_one = corpus.filter_units(Category::Vocabulary, &UnitFilter::single(1));
        let english: Vec<_> = unit_one.iter().map(|i| i.english.as_str()).collect();
        assert_eq!(english, vec!["near", "along"]);

        let all = corpus.filter_units(Category::Vocabulary, &UnitFilter::All);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_rejects_unit_zero() {
        let result = Corpus::from_json(
            r#"{ "phrases": [{ "english": "look at", "chinese": "看", "unit": 0 }] }"#,
        );
        assert!(matches!(
            result,
            Err(CorpusError::InvalidUnit {
                category: "phrases",
                index: 0,
                unit: 0
            })
        ));
    }

    #[test]
    fn test_rejects_empty_text() {
        let result = Corpus::from_json(
            r#"{ "vocabulary": [{ "english": "  ", "chinese": "空", "unit": 1 }] }"#,
        );
        assert!(matches!(result, Err(CorpusError::EmptyText { .. })));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Corpus::from_json("{ not json"),
            Err(CorpusError::Json(_))
        ));
    }
}
