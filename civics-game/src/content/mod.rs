//! Content provider contract.
//!
//! Lessons, quiz questions and review items come from an external,
//! pluggable generator. The core only sees the shapes defined here and a
//! single [`ContentFetchError`] for anything that goes wrong on the way.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod fixture;
pub mod payload;
pub mod prompts;

pub use fixture::{ContentPack, FixtureContentProvider};

/// A multiple-choice question as delivered by the provider.
///
/// `correct_answer` is expected to be one of `options`, but nothing here
/// relies on it: a question whose answer is missing simply cannot be
/// answered correctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
}

impl Question {
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|candidate| candidate == option)
    }
}

/// Lesson text plus the level's quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelContent {
    /// Markdown lesson body, rendered by the presentation layer.
    pub content: String,
    pub questions: Vec<Question>,
}

/// Review buckets a fact can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chamber {
    House,
    Senate,
    Both,
}

impl Chamber {
    pub const ALL: [Self; 3] = [Self::House, Self::Senate, Self::Both];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Senate => "Senate",
            Self::Both => "Both",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fact to sort in the drag-and-drop review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub content: String,
    pub category: Chamber,
}

/// Which request a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Level,
    FinalQuiz,
    Review,
}

impl ContentKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Level => "level content",
            Self::FinalQuiz => "final quiz",
            Self::Review => "review items",
        }
    }

    /// Message shown beside the retry affordance on the failed screen.
    #[must_use]
    pub const fn retry_message(self) -> &'static str {
        match self {
            Self::Level => "Failed to load level content. Please try again.",
            Self::FinalQuiz => "Failed to load the final quiz. Please try again.",
            Self::Review => "Failed to load the review activity. Please try again.",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentFetchError {
    #[error("{kind} request failed: {reason}")]
    Transport { kind: ContentKind, reason: String },
    #[error("{kind} payload is not valid JSON: {reason}")]
    Malformed { kind: ContentKind, reason: String },
    #[error("{kind} payload has the wrong shape: {reason}")]
    Schema { kind: ContentKind, reason: String },
}

impl ContentFetchError {
    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        match self {
            Self::Transport { kind, .. } | Self::Malformed { kind, .. } | Self::Schema { kind, .. } => {
                *kind
            }
        }
    }

    #[must_use]
    pub const fn retry_message(&self) -> &'static str {
        self.kind().retry_message()
    }

    pub fn transport(kind: ContentKind, reason: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            reason: reason.into(),
        }
    }

    pub fn schema(kind: ContentKind, reason: impl Into<String>) -> Self {
        Self::Schema {
            kind,
            reason: reason.into(),
        }
    }
}

/// Asynchronous source of lesson and quiz data.
///
/// Implementations resolve each call once, with either a payload that
/// matches the configured question counts or a [`ContentFetchError`].
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Lesson text and the level quiz for one catalog level.
    ///
    /// # Errors
    ///
    /// Any transport, parsing or shape problem.
    async fn fetch_level_content(
        &self,
        topic: &str,
        title: &str,
    ) -> Result<LevelContent, ContentFetchError>;

    /// Questions for the final quiz.
    ///
    /// # Errors
    ///
    /// Any transport, parsing or shape problem.
    async fn fetch_final_quiz(&self) -> Result<Vec<Question>, ContentFetchError>;

    /// Facts for the drag-and-drop review.
    ///
    /// # Errors
    ///
    /// Any transport, parsing or shape problem.
    async fn fetch_review_items(&self) -> Result<Vec<ReviewItem>, ContentFetchError>;
}
