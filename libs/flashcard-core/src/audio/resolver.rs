//! Audio filename resolution.
//!
//! Derives the candidate `.mp3` filenames under which a pronunciation may
//! have been recorded, in the order they should be tried:
//!
//! 1. keyword form, when key words are supplied (`great_wall_is_long.mp3`)
//! 2. 30-char short form, only when shorter than the raw text
//! 3. 50-char traditional form, always present
//! 4. 40-char form without sentence punctuation, when it differs from 3

use crate::types::Category;
use serde::{Deserialize, Serialize};

/// Length of the traditional filename.
pub const TRADITIONAL_MAX_LEN: usize = 50;
/// Length of the short filename.
pub const SHORT_MAX_LEN: usize = 30;
/// Length of the punctuation-stripped filename.
pub const NO_PUNCTUATION_MAX_LEN: usize = 40;
/// Most key words joined into a keyword filename.
pub const MAX_KEY_WORDS: usize = 4;

const EXTENSION: &str = ".mp3";
const UNSAFE_CHARS: &str = "<>:\"/\\|?*";
const SENTENCE_PUNCTUATION: &str = ".,!?;";

/// How many candidates the resolver produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// The full keyword/short/traditional/no-punctuation chain.
    Candidates,
    /// Only the traditional 50-char filename.
    TraditionalOnly,
}

impl Default for ResolutionMode {
    fn default() -> Self {
        Self::Candidates
    }
}

/// Candidate filenames for one text, bound to a category directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub base_path: String,
    pub category: Category,
    pub candidate_filenames: Vec<String>,
}

impl AssetRef {
    pub fn new(
        base_path: &str,
        category: Category,
        text: &str,
        key_words: &[String],
        mode: ResolutionMode,
    ) -> Self {
        let candidate_filenames = match mode {
            ResolutionMode::Candidates => resolve(text, key_words),
            ResolutionMode::TraditionalOnly => {
                vec![format!("{}{EXTENSION}", sanitize(text, TRADITIONAL_MAX_LEN))]
            }
        };
        Self {
            base_path: base_path.to_string(),
            category,
            candidate_filenames,
        }
    }

    /// Full asset paths in try order.
    pub fn paths(&self) -> Vec<String> {
        self.candidate_filenames
            .iter()
            .map(|filename| asset_path(&self.base_path, self.category, filename))
            .collect()
    }
}

/// `{base_path}/{category}/{filename}`
pub fn asset_path(base_path: &str, category: Category, filename: &str) -> String {
    format!(
        "{}/{}/{}",
        base_path.trim_end_matches('/'),
        category.as_str(),
        filename
    )
}

/// Candidate filenames for `text`, most specific first. Never empty.
pub fn resolve(text: &str, key_words: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(4);
    let mut push = |name: &str| {
        let filename = format!("{name}{EXTENSION}");
        if !candidates.contains(&filename) {
            candidates.push(filename);
        }
    };

    if let Some(keyword_name) = keyword_filename(key_words) {
        push(&keyword_name);
    }

    // Compares the sanitized length against the raw UTF-16 length of the text.
    let short = sanitize(text, SHORT_MAX_LEN);
    if short.len() < text.encode_utf16().count() {
        push(&short);
    }

    let traditional = sanitize(text, TRADITIONAL_MAX_LEN);
    push(&traditional);

    let no_punctuation = sanitize_without_punctuation(text, NO_PUNCTUATION_MAX_LEN);
    if no_punctuation != traditional {
        push(&no_punctuation);
    }

    candidates
}

/// Joins up to four cleaned key words with `_`, or `None` when nothing survives cleaning.
pub fn keyword_filename(key_words: &[String]) -> Option<String> {
    let cleaned: Vec<String> = key_words
        .iter()
        .map(|keyword| clean_keyword(keyword))
        .filter(|keyword| !keyword.is_empty())
        .take(MAX_KEY_WORDS)
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join("_"))
    }
}

fn clean_keyword(keyword: &str) -> String {
    let kept: String = keyword
        .to_lowercase()
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Lower-cases and reduces `text` to a filesystem-safe name of at most `max_len` chars.
pub fn sanitize(text: &str, max_len: usize) -> String {
    sanitize_with(text, max_len, UNSAFE_CHARS)
}

/// Like [`sanitize`], but also drops `. , ! ? ;`.
pub fn sanitize_without_punctuation(text: &str, max_len: usize) -> String {
    let removed: String = UNSAFE_CHARS.chars().chain(SENTENCE_PUNCTUATION.chars()).collect();
    sanitize_with(text, max_len, &removed)
}

fn sanitize_with(text: &str, max_len: usize, removed: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_underscore = false;

    for c in text.to_lowercase().chars() {
        if removed.contains(c) {
            continue;
        }
        let kept = is_word_char(c) || c == '\'' || c == '-';
        if kept && c != '_' {
            if pending_underscore && !out.is_empty() {
                out.push('_');
            }
            pending_underscore = false;
            out.push(c);
        } else {
            // whitespace runs, underscores and other symbols all collapse into one `_`
            pending_underscore = true;
        }
    }

    // `out` only holds ASCII at this point, so char and byte counts agree.
    // Separators are trimmed before the cut, so a cut may end on `_`.
    out.truncate(max_len.min(out.len()));
    out
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
