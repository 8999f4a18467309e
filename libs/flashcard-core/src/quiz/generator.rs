//! Question generation from the lexical corpus.
//!
//! All randomness comes from the caller's [`Rng`], so a seeded generator
//! reproduces a test exactly.

use crate::corpus::UnitFilter;
use crate::types::{LexicalItem, Question, QuestionOption, QuestionType};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tokens never chosen as a fill-in-blank answer.
pub const STOP_WORDS: [&str; 8] = ["the", "and", "for", "are", "you", "your", "have", "been"];

const ORDER_INSTRUCTION: &str = "Put the words in the correct order";
const SPLIT_PUNCTUATION: [char; 4] = [',', '.', '?', '!'];
const MAX_RESHUFFLES: usize = 8;

/// Tunables of the question generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Upper bound on distractors per choice question.
    pub distractor_count: usize,
    /// Replaces the answer token in fill-in-blank prompts.
    pub blank_marker: String,
    /// Sentences with fewer tokens are skipped for ordering questions.
    pub min_order_tokens: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            distractor_count: 3,
            blank_marker: "______".to_string(),
            min_order_tokens: 3,
        }
    }
}

/// Builds quiz questions from corpus items.
#[derive(Debug, Clone, Default)]
pub struct QuestionGenerator {
    config: GeneratorConfig,
}

impl QuestionGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build up to `count` questions from the items of `corpus` whose unit
    /// passes `units`.
    ///
    /// The result is shorter than `count` when the filtered corpus is, and
    /// also when some items cannot yield a question of the requested type.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        corpus: &[LexicalItem],
        units: &UnitFilter,
        question_type: QuestionType,
        count: usize,
        rng: &mut R,
    ) -> Vec<Question> {
        let mut pool: Vec<&LexicalItem> = corpus
            .iter()
            .filter(|item| units.matches(item.unit))
            .collect();
        pool.shuffle(rng);

        let selected = &pool[..count.min(pool.len())];
        let questions: Vec<Question> = selected
            .iter()
            .filter_map(|item| match question_type {
                QuestionType::MultipleChoice => Some(self.multiple_choice(item, &pool, rng)),
                QuestionType::FillInBlank => self.fill_in_blank(item, corpus, rng),
                QuestionType::SentenceOrder => self.sentence_order(item, rng),
            })
            .collect();

        tracing::debug!(
            requested = count,
            eligible = pool.len(),
            generated = questions.len(),
            ?question_type,
            "generated questions"
        );
        questions
    }

    /// Translation choice question. Distractors come from `pool`, same unit first.
    pub fn multiple_choice<R: Rng + ?Sized>(
        &self,
        item: &LexicalItem,
        pool: &[&LexicalItem],
        rng: &mut R,
    ) -> Question {
        let wanted = self.config.distractor_count;
        let (mut same_unit, other_units): (Vec<&LexicalItem>, Vec<&LexicalItem>) = pool
            .iter()
            .copied()
            .filter(|other| other.english != item.english && other.chinese != item.chinese)
            .partition(|other| other.unit == item.unit);

        same_unit.shuffle(rng);
        same_unit.truncate(wanted);
        if same_unit.len() < wanted {
            let missing = wanted - same_unit.len();
            same_unit.extend(other_units.choose_multiple(rng, missing).copied());
        }

        let mut options = vec![QuestionOption::correct(&item.chinese)];
        options.extend(
            same_unit
                .iter()
                .map(|distractor| QuestionOption::distractor(&distractor.chinese)),
        );
        options.shuffle(rng);

        Question::MultipleChoice {
            prompt_text: item.english.clone(),
            correct_answer_text: item.chinese.clone(),
            unit: item.unit,
            options,
        }
    }

    /// Blanks one significant token of the item's text.
    ///
    /// Returns `None` when every token is short or a stop word.
    pub fn fill_in_blank<R: Rng + ?Sized>(
        &self,
        item: &LexicalItem,
        corpus: &[LexicalItem],
        rng: &mut R,
    ) -> Option<Question> {
        let candidates: Vec<&str> = item
            .english
            .split_whitespace()
            .filter(|token| is_blank_candidate(token))
            .collect();
        let answer = *candidates.choose(rng)?;

        let mut options = vec![QuestionOption::correct(answer)];
        options.extend(
            word_distractors(answer, corpus, self.config.distractor_count, rng)
                .into_iter()
                .map(QuestionOption::distractor),
        );
        options.shuffle(rng);

        Some(Question::FillInBlank {
            blanked_text: item.english.replacen(answer, &self.config.blank_marker, 1),
            correct_answer_token: answer.to_string(),
            full_text: item.english.clone(),
            translation: item.chinese.clone(),
            unit: item.unit,
            options,
        })
    }

    /// Scrambles the item's tokens, keeping the original order as the answer.
    pub fn sentence_order<R: Rng + ?Sized>(
        &self,
        item: &LexicalItem,
        rng: &mut R,
    ) -> Option<Question> {
        let original_tokens = tokenize_sentence(&item.english);
        if original_tokens.len() < self.config.min_order_tokens {
            return None;
        }

        let mut shuffled_tokens = original_tokens.clone();
        for _ in 0..MAX_RESHUFFLES {
            shuffled_tokens.shuffle(rng);
            if shuffled_tokens != original_tokens {
                break;
            }
        }

        Some(Question::SentenceOrder {
            instruction_text: ORDER_INSTRUCTION.to_string(),
            original_tokens,
            shuffled_tokens,
            translation: item.chinese.clone(),
            unit: item.unit,
            key_words: item.key_words.clone().unwrap_or_default(),
        })
    }
}

/// Build questions with the default configuration.
pub fn generate<R: Rng + ?Sized>(
    corpus: &[LexicalItem],
    units: &UnitFilter,
    question_type: QuestionType,
    count: usize,
    rng: &mut R,
) -> Vec<Question> {
    QuestionGenerator::default().generate(corpus, units, question_type, count, rng)
}

/// Whitespace tokens with trailing `, . ? !` split off one character per token.
pub fn tokenize_sentence(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split_whitespace() {
        let stem = word.trim_end_matches(SPLIT_PUNCTUATION);
        if !stem.is_empty() {
            tokens.push(stem.to_string());
        }
        tokens.extend(word[stem.len()..].chars().map(String::from));
    }
    tokens
}

fn is_blank_candidate(token: &str) -> bool {
    token.chars().count() > 3 && !STOP_WORDS.contains(&token.to_lowercase().as_str())
}

fn clean_word(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .filter(|c| !SPLIT_PUNCTUATION.contains(c))
        .collect()
}

/// Distinct cleaned words of the corpus other than `answer`, sampled without replacement.
fn word_distractors<R: Rng + ?Sized>(
    answer: &str,
    corpus: &[LexicalItem],
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let answer_lower = answer.to_lowercase();
    let answer_clean = clean_word(answer);

    // ordered set keeps sampling reproducible under a seeded rng
    let words: BTreeSet<String> = corpus
        .iter()
        .flat_map(|item| item.english.split_whitespace())
        .map(clean_word)
        .filter(|word| word.chars().count() > 2 && *word != answer_lower && *word != answer_clean)
        .collect();

    let words: Vec<String> = words.into_iter().collect();
    words.choose_multiple(rng, count).cloned().collect()
}
