//! Per-screen quiz and activity sessions.
//!
//! Sessions hold the fetched content for one screen plus the learner's local
//! progress through it. They never touch [`crate::GameState`]; the controller
//! turns their outcomes into progression operations.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::Question;

pub mod final_quiz;
pub mod level_quiz;
pub mod review;

pub use final_quiz::{FinalQuizSession, FinalQuizStep};
pub use level_quiz::{LevelQuizPhase, LevelQuizSession, LevelQuizStep};
pub use review::{Bucket, ReviewFeedback, ReviewSession};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no questions were provided")]
    NoQuestions,
    #[error("no review items were provided")]
    NoItems,
    #[error("`{0}` is not an option for this question")]
    UnknownOption(String),
    #[error("select an answer first")]
    NothingSelected,
    #[error("this question has already been answered")]
    AlreadyAnswered,
    #[error("answer the current question before moving on")]
    NotAnswered,
    #[error("the quiz is over")]
    QuizOver,
    #[error("retry is only offered after a failed attempt")]
    NotFailed,
    #[error("review item {0} does not exist")]
    UnknownItem(usize),
    #[error("{remaining} review items are still unassigned")]
    ItemsUnassigned { remaining: usize },
    #[error("answers have already been checked")]
    AlreadyChecked,
    #[error("check the answers before continuing")]
    NotChecked,
}

/// Highlight for one answer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptionFeedback {
    #[default]
    Neutral,
    Selected,
    Correct,
    Incorrect,
}

/// Feedback for each option of `question`, in option order.
///
/// Before grading only the selection is marked. After grading the correct
/// option is marked and a wrong selection is flagged.
pub(crate) fn option_feedback(
    question: &Question,
    selected: Option<&str>,
    graded: bool,
) -> Vec<OptionFeedback> {
    question
        .options
        .iter()
        .map(|option| {
            let is_selected = selected == Some(option.as_str());
            if !graded {
                if is_selected {
                    OptionFeedback::Selected
                } else {
                    OptionFeedback::Neutral
                }
            } else if question.is_correct(option) {
                OptionFeedback::Correct
            } else if is_selected {
                OptionFeedback::Incorrect
            } else {
                OptionFeedback::Neutral
            }
        })
        .collect()
}

pub(crate) fn ensure_option(question: &Question, option: &str) -> Result<(), SessionError> {
    if question.has_option(option) {
        Ok(())
    } else {
        Err(SessionError::UnknownOption(option.to_string()))
    }
}
