//! Scoring and review of answered questions.

use crate::types::{join_tokens, Question, UserAnswer};
use serde::{Deserialize, Serialize};

/// Aggregate result of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub correct_count: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent; 0 for an empty test.
    pub percentage: u32,
}

/// Per-question detail shown after a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerReview {
    pub position: usize,
    pub prompt: String,
    pub is_correct: bool,
    /// `None` when unanswered.
    pub user_answer: Option<String>,
    pub correct_answer: String,
}

/// Whether `answer` is correct for `question`.
///
/// Unanswered questions, out-of-range choices and answers of the wrong kind
/// are all incorrect.
pub fn is_correct(question: &Question, answer: Option<&UserAnswer>) -> bool {
    match (question, answer) {
        (_, None) => false,
        (Question::SentenceOrder { original_tokens, .. }, Some(UserAnswer::Tokens(tokens))) => {
            tokens == original_tokens
        }
        (Question::SentenceOrder { .. }, Some(UserAnswer::Choice(_))) => false,
        (
            Question::MultipleChoice { options, .. } | Question::FillInBlank { options, .. },
            Some(UserAnswer::Choice(index)),
        ) => options.get(*index).is_some_and(|option| option.is_correct),
        (
            Question::MultipleChoice { .. } | Question::FillInBlank { .. },
            Some(UserAnswer::Tokens(_)),
        ) => false,
    }
}

/// Score `answers` against `questions` position by position.
///
/// Missing trailing answers count as unanswered.
pub fn score(questions: &[Question], answers: &[Option<UserAnswer>]) -> ScoreReport {
    let total = questions.len();
    let correct_count = questions
        .iter()
        .enumerate()
        .filter(|(position, question)| is_correct(question, answer_at(answers, *position)))
        .count();

    ScoreReport {
        correct_count,
        total,
        percentage: percentage(correct_count, total),
    }
}

/// Questions scored incorrect, in their original order.
pub fn mistake_subset(questions: &[Question], answers: &[Option<UserAnswer>]) -> Vec<Question> {
    questions
        .iter()
        .enumerate()
        .filter(|(position, question)| !is_correct(question, answer_at(answers, *position)))
        .map(|(_, question)| question.clone())
        .collect()
}

pub fn review(questions: &[Question], answers: &[Option<UserAnswer>]) -> Vec<AnswerReview> {
    questions
        .iter()
        .enumerate()
        .map(|(position, question)| {
            let answer = answer_at(answers, position);
            AnswerReview {
                position,
                prompt: question.prompt().to_string(),
                is_correct: is_correct(question, answer),
                user_answer: answer.and_then(|answer| answer_text(question, answer)),
                correct_answer: question.correct_answer_text(),
            }
        })
        .collect()
}

/// The submitted answer rendered as text, if it can be.
pub fn answer_text(question: &Question, answer: &UserAnswer) -> Option<String> {
    match answer {
        UserAnswer::Choice(index) => question
            .options()
            .and_then(|options| options.get(*index))
            .map(|option| option.text.clone()),
        UserAnswer::Tokens(tokens) => Some(join_tokens(tokens)),
    }
}

fn answer_at(answers: &[Option<UserAnswer>], position: usize) -> Option<&UserAnswer> {
    answers.get(position).and_then(Option::as_ref)
}

fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 * 100.0 / total as f64).round() as u32
}
