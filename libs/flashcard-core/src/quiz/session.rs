//! Test session state.

use super::scoring::{self, AnswerReview, ScoreReport};
use crate::error::{QuizError, Result};
use crate::types::{Question, UserAnswer};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Fewest questions a learner may ask for.
pub const DEFAULT_MIN_QUESTIONS: usize = 5;
/// Most questions a learner may ask for.
pub const DEFAULT_MAX_QUESTIONS: usize = 50;

/// Clamp a requested question count into `[min, max]`.
pub fn clamp_question_count(requested: usize, min: usize, max: usize) -> usize {
    requested.clamp(min, max.max(min))
}

/// One run through a list of generated questions.
///
/// `answers` is aligned by position with `questions`; `None` is unanswered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSession {
    questions: Vec<Question>,
    answers: Vec<Option<UserAnswer>>,
    current_index: usize,
    started_at: DateTime<Utc>,
}

impl TestSession {
    pub fn start(questions: Vec<Question>) -> Result<Self> {
        Self::start_at(questions, Utc::now())
    }

    pub fn start_at(questions: Vec<Question>, now: DateTime<Utc>) -> Result<Self> {
        if questions.is_empty() {
            return Err(QuizError::InsufficientCorpus { requested: 0 });
        }
        Ok(Self {
            answers: vec![None; questions.len()],
            questions,
            current_index: 0,
            started_at: now,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<UserAnswer>] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn question(&self, position: usize) -> Result<&Question> {
        self.questions
            .get(position)
            .ok_or(QuizError::PositionOutOfRange {
                position,
                len: self.questions.len(),
            })
    }

    pub fn answer(&self, position: usize) -> Option<&UserAnswer> {
        self.answers.get(position).and_then(Option::as_ref)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|answer| answer.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    /// Store `answer` for the question at `position`, replacing any earlier one.
    pub fn submit_answer(&mut self, position: usize, answer: UserAnswer) -> Result<()> {
        let question = self.question(position)?;
        match (question, &answer) {
            (Question::SentenceOrder { .. }, UserAnswer::Tokens(_)) => {}
            (Question::SentenceOrder { .. }, UserAnswer::Choice(_))
            | (
                Question::MultipleChoice { .. } | Question::FillInBlank { .. },
                UserAnswer::Tokens(_),
            ) => return Err(QuizError::AnswerKindMismatch { position }),
            (_, UserAnswer::Choice(option)) => {
                let count = question.options().map_or(0, |options| options.len());
                if *option >= count {
                    return Err(QuizError::InvalidOption {
                        position,
                        option: *option,
                    });
                }
            }
        }
        self.answers[position] = Some(answer);
        Ok(())
    }

    /// Answer the current question and move on.
    ///
    /// Returns `true` when the answered question was the last one.
    pub fn answer_current(&mut self, answer: UserAnswer) -> Result<bool> {
        self.submit_answer(self.current_index, answer)?;
        if self.is_last() {
            Ok(true)
        } else {
            self.current_index += 1;
            Ok(false)
        }
    }

    /// Advance the cursor; `false` when already on the last question.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current_index += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        true
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    /// Same questions, no answers, clock reset.
    pub fn restart(&mut self) {
        self.restart_at(Utc::now());
    }

    pub fn restart_at(&mut self, now: DateTime<Utc>) {
        self.answers = vec![None; self.questions.len()];
        self.current_index = 0;
        self.started_at = now;
    }

    /// Keep only the questions answered wrongly and start over on them.
    ///
    /// Returns the number of questions left.
    pub fn retest_mistakes(&mut self) -> Result<usize> {
        self.retest_mistakes_at(Utc::now())
    }

    pub fn retest_mistakes_at(&mut self, now: DateTime<Utc>) -> Result<usize> {
        let mistakes = scoring::mistake_subset(&self.questions, &self.answers);
        if mistakes.is_empty() {
            return Err(QuizError::NoMistakes);
        }
        self.questions = mistakes;
        self.restart_at(now);
        Ok(self.questions.len())
    }

    pub fn score(&self) -> ScoreReport {
        scoring::score(&self.questions, &self.answers)
    }

    pub fn review(&self) -> Vec<AnswerReview> {
        scoring::review(&self.questions, &self.answers)
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.started_at
    }
}
