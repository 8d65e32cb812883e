//! Quiz sizing and pass/fail thresholds
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_FINAL_QUIZ_QUESTIONS, DEFAULT_LEVEL_PASS_THRESHOLD, DEFAULT_LEVEL_QUIZ_QUESTIONS,
    DEFAULT_REVIEW_ITEM_COUNT,
};

const DEFAULT_RULES_DATA: &str = include_str!("../../static/assets/data/rules.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRules {
    #[serde(default = "QuizRules::default_level_quiz_questions")]
    pub level_quiz_questions: usize,
    #[serde(default = "QuizRules::default_level_pass_threshold")]
    pub level_pass_threshold: usize,
    #[serde(default = "QuizRules::default_final_quiz_questions")]
    pub final_quiz_questions: usize,
    #[serde(default = "QuizRules::default_review_item_count")]
    pub review_item_count: usize,
}

/// Errors raised when quiz rules are internally inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
    #[error("pass threshold {threshold} exceeds level quiz length {questions}")]
    ThresholdTooHigh { threshold: usize, questions: usize },
}

#[derive(Debug, Error)]
pub enum RulesLoadError {
    #[error("rules could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] RulesError),
}

impl QuizRules {
    const fn default_level_quiz_questions() -> usize {
        DEFAULT_LEVEL_QUIZ_QUESTIONS
    }

    const fn default_level_pass_threshold() -> usize {
        DEFAULT_LEVEL_PASS_THRESHOLD
    }

    const fn default_final_quiz_questions() -> usize {
        DEFAULT_FINAL_QUIZ_QUESTIONS
    }

    const fn default_review_item_count() -> usize {
        DEFAULT_REVIEW_ITEM_COUNT
    }

    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            level_quiz_questions: DEFAULT_LEVEL_QUIZ_QUESTIONS,
            level_pass_threshold: DEFAULT_LEVEL_PASS_THRESHOLD,
            final_quiz_questions: DEFAULT_FINAL_QUIZ_QUESTIONS,
            review_item_count: DEFAULT_REVIEW_ITEM_COUNT,
        }
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::default()
    }

    /// Parse rules from JSON, then validate them.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the rules fail validation.
    pub fn from_json(json: &str) -> Result<Self, RulesLoadError> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check counts are positive and the pass threshold is reachable.
    ///
    /// # Errors
    ///
    /// Returns a [`RulesError`] describing the first violated constraint.
    pub const fn validate(&self) -> Result<(), RulesError> {
        if self.level_quiz_questions == 0 {
            return Err(RulesError::ZeroCount {
                field: "level_quiz_questions",
            });
        }
        if self.final_quiz_questions == 0 {
            return Err(RulesError::ZeroCount {
                field: "final_quiz_questions",
            });
        }
        if self.review_item_count == 0 {
            return Err(RulesError::ZeroCount {
                field: "review_item_count",
            });
        }
        if self.level_pass_threshold > self.level_quiz_questions {
            return Err(RulesError::ThresholdTooHigh {
                threshold: self.level_pass_threshold,
                questions: self.level_quiz_questions,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn level_passed(&self, correct: usize) -> bool {
        correct >= self.level_pass_threshold
    }
}

impl Default for QuizRules {
    fn default() -> Self {
        Self::from_json(DEFAULT_RULES_DATA).unwrap_or_else(|_| Self::builtin())
    }
}
