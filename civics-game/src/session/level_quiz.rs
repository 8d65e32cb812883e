//! Short quiz at the end of a lesson.
use serde::{Deserialize, Serialize};

use super::{OptionFeedback, SessionError, ensure_option, option_feedback};
use crate::catalog::LevelId;
use crate::constants::LOG_TARGET_SESSION;
use crate::content::{LevelContent, Question};
use crate::rules::QuizRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelQuizPhase {
    Answering,
    Passed,
    Failed,
}

/// Outcome of moving past a graded question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelQuizStep {
    Advanced { index: usize },
    /// Threshold met; the level should be completed.
    Passed { score: usize },
    /// Threshold missed; the learner may retry.
    Failed { score: usize },
}

/// Lesson text and quiz for one level.
///
/// Answers are selected, then submitted for grading, then the learner moves
/// on. A failed attempt can be retried without fetching new content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelQuizSession {
    level: LevelId,
    content: LevelContent,
    pass_threshold: usize,
    index: usize,
    selected: Option<String>,
    graded: Option<bool>,
    score: usize,
    phase: LevelQuizPhase,
}

impl LevelQuizSession {
    /// # Errors
    ///
    /// [`SessionError::NoQuestions`] when the content carries no quiz.
    pub fn new(level: LevelId, content: LevelContent, rules: &QuizRules) -> Result<Self, SessionError> {
        if content.questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        Ok(Self {
            level,
            content,
            pass_threshold: rules.level_pass_threshold,
            index: 0,
            selected: None,
            graded: None,
            score: 0,
            phase: LevelQuizPhase::Answering,
        })
    }

    #[must_use]
    pub const fn level(&self) -> LevelId {
        self.level
    }

    #[must_use]
    pub fn lesson(&self) -> &str {
        &self.content.content
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.content.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.content.questions.len()
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.content.questions.get(self.index)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// `Some(correct)` once the current question has been submitted.
    #[must_use]
    pub const fn last_answer_correct(&self) -> Option<bool> {
        self.graded
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn phase(&self) -> LevelQuizPhase {
        self.phase
    }

    fn answering(&self) -> Result<&Question, SessionError> {
        if self.phase != LevelQuizPhase::Answering {
            return Err(SessionError::QuizOver);
        }
        self.current_question().ok_or(SessionError::QuizOver)
    }

    /// Choose an option for the current question. Changing the choice is
    /// allowed until it is submitted.
    ///
    /// # Errors
    ///
    /// Fails after submission, once the quiz is over, or for an option the
    /// question does not offer.
    pub fn select(&mut self, option: &str) -> Result<(), SessionError> {
        let question = self.answering()?;
        if self.graded.is_some() {
            return Err(SessionError::AlreadyAnswered);
        }
        ensure_option(question, option)?;
        self.selected = Some(option.to_string());
        Ok(())
    }

    /// Grade the selected option.
    ///
    /// # Errors
    ///
    /// Fails without a selection or when already graded.
    pub fn submit(&mut self) -> Result<bool, SessionError> {
        let question = self.answering()?;
        if self.graded.is_some() {
            return Err(SessionError::AlreadyAnswered);
        }
        let Some(selected) = self.selected.as_deref() else {
            return Err(SessionError::NothingSelected);
        };
        let correct = question.is_correct(selected);
        if correct {
            self.score += 1;
        }
        self.graded = Some(correct);
        Ok(correct)
    }

    /// Move past a graded question. After the last one the attempt is
    /// scored against the pass threshold.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotAnswered`] before the current question is graded.
    pub fn next(&mut self) -> Result<LevelQuizStep, SessionError> {
        self.answering()?;
        if self.graded.is_none() {
            return Err(SessionError::NotAnswered);
        }
        self.selected = None;
        self.graded = None;
        if self.index + 1 < self.question_count() {
            self.index += 1;
            return Ok(LevelQuizStep::Advanced { index: self.index });
        }
        log::debug!(
            target: LOG_TARGET_SESSION,
            "level {} quiz finished with {}/{}",
            self.level,
            self.score,
            self.question_count()
        );
        if self.score >= self.pass_threshold {
            self.phase = LevelQuizPhase::Passed;
            Ok(LevelQuizStep::Passed { score: self.score })
        } else {
            self.phase = LevelQuizPhase::Failed;
            Ok(LevelQuizStep::Failed { score: self.score })
        }
    }

    /// Start the same questions over after a failed attempt.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFailed`] unless the last attempt failed.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        if self.phase != LevelQuizPhase::Failed {
            return Err(SessionError::NotFailed);
        }
        self.index = 0;
        self.selected = None;
        self.graded = None;
        self.score = 0;
        self.phase = LevelQuizPhase::Answering;
        Ok(())
    }

    #[must_use]
    pub fn option_feedback(&self) -> Vec<OptionFeedback> {
        self.current_question().map_or_else(Vec::new, |question| {
            option_feedback(question, self.selected(), self.graded.is_some())
        })
    }
}
