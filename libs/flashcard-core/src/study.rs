//! Flashcard study deck and the persisted progress snapshot.

use crate::audio::{PlayOptions, QueueItem};
use crate::corpus::{Corpus, UnitFilter};
use crate::types::{Category, Difficulty, LexicalItem};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Running counters of a study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyStats {
    #[serde(alias = "totalStudied")]
    pub total_studied: u32,
    #[serde(alias = "correctCount")]
    pub correct_count: u32,
    #[serde(alias = "hardCount")]
    pub hard_count: u32,
    #[serde(alias = "startTime")]
    pub started_at: DateTime<Utc>,
}

impl StudyStats {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            total_studied: 0,
            correct_count: 0,
            hard_count: 0,
            started_at,
        }
    }

    /// Whole minutes since the stats were started.
    pub fn study_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_minutes()
    }
}

impl Default for StudyStats {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

/// What the collaborator persists between visits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default, alias = "studyStats")]
    pub study_stats: StudyStats,
    #[serde(default, alias = "currentData")]
    pub current_category: Category,
    /// `None` means every unit.
    #[serde(default, alias = "currentUnit")]
    pub current_unit: Option<u32>,
}

impl ProgressSnapshot {
    pub fn unit_filter(&self) -> UnitFilter {
        self.current_unit.map_or(UnitFilter::All, UnitFilter::single)
    }
}

/// A browsable stack of flashcards over one category.
#[derive(Debug, Clone)]
pub struct StudyDeck {
    category: Category,
    unit: Option<u32>,
    ordered: Vec<LexicalItem>,
    cards: Vec<LexicalItem>,
    index: usize,
    flipped: bool,
    shuffled: bool,
    repeat: bool,
    stats: StudyStats,
}

impl StudyDeck {
    pub fn new(corpus: &Corpus, category: Category, unit: Option<u32>) -> Self {
        Self::with_stats(corpus, category, unit, StudyStats::default())
    }

    pub fn with_stats(
        corpus: &Corpus,
        category: Category,
        unit: Option<u32>,
        stats: StudyStats,
    ) -> Self {
        let mut deck = Self {
            category,
            unit,
            ordered: Vec::new(),
            cards: Vec::new(),
            index: 0,
            flipped: false,
            shuffled: false,
            repeat: false,
            stats,
        };
        deck.select(corpus, category, unit);
        deck
    }

    /// Restore a deck from a persisted snapshot.
    pub fn from_snapshot(corpus: &Corpus, snapshot: &ProgressSnapshot) -> Self {
        Self::with_stats(
            corpus,
            snapshot.current_category,
            snapshot.current_unit,
            snapshot.study_stats.clone(),
        )
    }

    /// Switch category or unit. Resets the cursor and the shuffle.
    pub fn select(&mut self, corpus: &Corpus, category: Category, unit: Option<u32>) {
        let filter = unit.map_or(UnitFilter::All, UnitFilter::single);
        self.category = category;
        self.unit = unit;
        self.ordered = corpus
            .filter_units(category, &filter)
            .into_iter()
            .cloned()
            .collect();
        self.cards = self.ordered.clone();
        self.shuffled = false;
        self.reset_cursor();
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn unit(&self) -> Option<u32> {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn current(&self) -> Option<&LexicalItem> {
        self.cards.get(self.index)
    }

    /// One-based position and deck size; `(0, 0)` when empty.
    pub fn position(&self) -> (usize, usize) {
        if self.cards.is_empty() {
            (0, 0)
        } else {
            (self.index + 1, self.cards.len())
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    pub fn stats(&self) -> &StudyStats {
        &self.stats
    }

    /// Shuffle the deck, or restore corpus order when already shuffled.
    pub fn toggle_shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.shuffled = !self.shuffled;
        if self.shuffled {
            self.cards.shuffle(rng);
        } else {
            self.cards = self.ordered.clone();
        }
        self.reset_cursor();
    }

    /// Turn the card over. Returns whether the answer side is now showing.
    pub fn flip(&mut self) -> bool {
        if self.cards.is_empty() {
            return false;
        }
        self.flipped = !self.flipped;
        if self.flipped {
            self.stats.total_studied += 1;
        }
        self.flipped
    }

    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.cards.len() {
            self.index += 1;
        } else if self.repeat && !self.cards.is_empty() {
            self.index = 0;
        } else {
            return false;
        }
        self.flipped = false;
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
        } else if self.repeat && !self.cards.is_empty() {
            self.index = self.cards.len() - 1;
        } else {
            return false;
        }
        self.flipped = false;
        true
    }

    /// Rate the current card and move to the next one.
    pub fn mark(&mut self, difficulty: Difficulty) {
        if self.cards.is_empty() {
            return;
        }
        if !self.flipped {
            self.flip();
        }
        match difficulty {
            Difficulty::Easy => self.stats.correct_count += 1,
            Difficulty::Hard => self.stats.hard_count += 1,
            Difficulty::Good => {}
        }
        self.next();
    }

    /// Pronunciation request for the current card; sentences carry their key words.
    pub fn pronunciation(&self) -> Option<QueueItem> {
        let card = self.current()?;
        let options = match (&card.key_words, self.category) {
            (Some(key_words), Category::Sentences) => PlayOptions::with_key_words(key_words.clone()),
            _ => PlayOptions::default(),
        };
        Some(QueueItem {
            text: card.english.clone(),
            category: self.category,
            options,
        })
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            study_stats: self.stats.clone(),
            current_category: self.category,
            current_unit: self.unit,
        }
    }

    fn reset_cursor(&mut self) {
        self.index = 0;
        self.flipped = false;
    }
}
