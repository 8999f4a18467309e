//! Core types for the vocabulary flashcard application.

use serde::{Deserialize, Serialize};

/// One vocabulary, phrase or sentence entry of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalItem {
    pub english: String,
    pub chinese: String,
    pub unit: u32,
    #[serde(
        default,
        alias = "keyWords",
        skip_serializing_if = "Option::is_none"
    )]
    pub key_words: Option<Vec<String>>,
}

impl LexicalItem {
    pub fn new(english: impl Into<String>, chinese: impl Into<String>, unit: u32) -> Self {
        Self {
            english: english.into(),
            chinese: chinese.into(),
            unit,
            key_words: None,
        }
    }

    pub fn with_key_words<I, S>(mut self, key_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_words = Some(key_words.into_iter().map(Into::into).collect());
        self
    }
}

/// Corpus section, which is also the audio asset sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Vocabulary,
    Phrases,
    Sentences,
}

impl Default for Category {
    fn default() -> Self {
        Self::Vocabulary
    }
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Vocabulary, Self::Phrases, Self::Sentences];

    /// Get the category name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vocabulary => "vocabulary",
            Self::Phrases => "phrases",
            Self::Sentences => "sentences",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "vocabulary" => Some(Self::Vocabulary),
            "phrases" => Some(Self::Phrases),
            "sentences" => Some(Self::Sentences),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of quiz question to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    FillInBlank,
    SentenceOrder,
}

impl QuestionType {
    /// Question type a test over the given category uses by default.
    pub fn default_for(category: Category) -> Self {
        match category {
            Category::Vocabulary | Category::Phrases => Self::MultipleChoice,
            Category::Sentences => Self::FillInBlank,
        }
    }
}

/// One selectable answer of a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
    pub is_correct: bool,
}

impl QuestionOption {
    pub fn correct(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_correct: true,
        }
    }

    pub fn distractor(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_correct: false,
        }
    }
}

/// A generated quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Question {
    MultipleChoice {
        prompt_text: String,
        correct_answer_text: String,
        unit: u32,
        options: Vec<QuestionOption>,
    },
    FillInBlank {
        blanked_text: String,
        correct_answer_token: String,
        full_text: String,
        translation: String,
        unit: u32,
        options: Vec<QuestionOption>,
    },
    SentenceOrder {
        instruction_text: String,
        original_tokens: Vec<String>,
        shuffled_tokens: Vec<String>,
        translation: String,
        unit: u32,
        key_words: Vec<String>,
    },
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::MultipleChoice { .. } => QuestionType::MultipleChoice,
            Self::FillInBlank { .. } => QuestionType::FillInBlank,
            Self::SentenceOrder { .. } => QuestionType::SentenceOrder,
        }
    }

    pub fn unit(&self) -> u32 {
        match self {
            Self::MultipleChoice { unit, .. }
            | Self::FillInBlank { unit, .. }
            | Self::SentenceOrder { unit, .. } => *unit,
        }
    }

    /// Text shown to the learner as the question.
    pub fn prompt(&self) -> &str {
        match self {
            Self::MultipleChoice { prompt_text, .. } => prompt_text,
            Self::FillInBlank { blanked_text, .. } => blanked_text,
            Self::SentenceOrder { translation, .. } => translation,
        }
    }

    /// Options of a choice question; `None` for sentence ordering.
    pub fn options(&self) -> Option<&[QuestionOption]> {
        match self {
            Self::MultipleChoice { options, .. } | Self::FillInBlank { options, .. } => {
                Some(options)
            }
            Self::SentenceOrder { .. } => None,
        }
    }

    /// Canonical answer rendered as text.
    pub fn correct_answer_text(&self) -> String {
        match self {
            Self::MultipleChoice {
                correct_answer_text,
                ..
            } => correct_answer_text.clone(),
            Self::FillInBlank {
                correct_answer_token,
                ..
            } => correct_answer_token.clone(),
            Self::SentenceOrder {
                original_tokens, ..
            } => join_tokens(original_tokens),
        }
    }
}

/// Joins sentence tokens back into text, attaching split-off punctuation.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut text = String::new();
    for token in tokens {
        let token = token.as_ref();
        let is_punctuation = token.len() == 1 && token.chars().all(|c| ",.?!".contains(c));
        if !text.is_empty() && !is_punctuation {
            text.push(' ');
        }
        text.push_str(token);
    }
    text
}

/// A learner's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserAnswer {
    /// Index into the question's options.
    Choice(usize),
    /// Submitted token order for a sentence-order question.
    Tokens(Vec<String>),
}

/// Self-assessed difficulty of a flashcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Hard,
    Good,
    Easy,
}
