//! Offline content provider backed by the bundled content pack.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

use super::payload::{validate_questions, validate_review_items};
use super::{ContentFetchError, ContentKind, ContentProvider, LevelContent, Question, ReviewItem};
use crate::catalog::LevelId;
use crate::constants::LOG_TARGET_CONTENT;
use crate::rules::QuizRules;

const DEFAULT_CONTENT_DATA: &str = include_str!("../../../static/assets/data/content.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedLevel {
    pub level: LevelId,
    pub title: String,
    pub content: String,
    pub questions: Vec<Question>,
}

/// Pre-authored lessons, quizzes and review items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContentPack {
    #[serde(default)]
    pub levels: Vec<PackedLevel>,
    #[serde(default)]
    pub final_quiz: Vec<Question>,
    #[serde(default)]
    pub review_items: Vec<ReviewItem>,
}

impl ContentPack {
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a content pack.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_CONTENT_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn level_by_title(&self, title: &str) -> Option<&PackedLevel> {
        self.levels.iter().find(|level| level.title == title)
    }
}

#[derive(Debug, Default)]
struct FailurePlan {
    level: AtomicU32,
    final_quiz: AtomicU32,
    review: AtomicU32,
}

impl FailurePlan {
    const fn counter(&self, kind: ContentKind) -> &AtomicU32 {
        match kind {
            ContentKind::Level => &self.level,
            ContentKind::FinalQuiz => &self.final_quiz,
            ContentKind::Review => &self.review,
        }
    }

    /// Consume one scheduled failure, if any remain.
    fn take(&self, kind: ContentKind) -> bool {
        self.counter(kind)
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

/// Serves the content pack through the provider contract, applying the
/// same shape checks a generated payload goes through.
#[derive(Debug)]
pub struct FixtureContentProvider {
    pack: ContentPack,
    rules: QuizRules,
    failures: FailurePlan,
}

impl FixtureContentProvider {
    #[must_use]
    pub fn new(pack: ContentPack, rules: QuizRules) -> Self {
        Self {
            pack,
            rules,
            failures: FailurePlan::default(),
        }
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::new(ContentPack::load_from_static(), QuizRules::load_from_static())
    }

    #[must_use]
    pub const fn pack(&self) -> &ContentPack {
        &self.pack
    }

    /// Make the next `times` requests of `kind` fail with a transport error.
    pub fn fail_next(&self, kind: ContentKind, times: u32) {
        self.failures.counter(kind).fetch_add(times, Ordering::SeqCst);
    }

    fn check_failure(&self, kind: ContentKind) -> Result<(), ContentFetchError> {
        if self.failures.take(kind) {
            log::warn!(target: LOG_TARGET_CONTENT, "simulated {kind} outage");
            return Err(ContentFetchError::transport(kind, "simulated outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentProvider for FixtureContentProvider {
    async fn fetch_level_content(
        &self,
        topic: &str,
        title: &str,
    ) -> Result<LevelContent, ContentFetchError> {
        self.check_failure(ContentKind::Level)?;
        let Some(level) = self.pack.level_by_title(title) else {
            return Err(ContentFetchError::transport(
                ContentKind::Level,
                format!("no packed lesson for \"{title}\" ({topic})"),
            ));
        };
        validate_questions(
            ContentKind::Level,
            &level.questions,
            self.rules.level_quiz_questions,
        )?;
        Ok(LevelContent {
            content: level.content.clone(),
            questions: level.questions.clone(),
        })
    }

    async fn fetch_final_quiz(&self) -> Result<Vec<Question>, ContentFetchError> {
        self.check_failure(ContentKind::FinalQuiz)?;
        validate_questions(
            ContentKind::FinalQuiz,
            &self.pack.final_quiz,
            self.rules.final_quiz_questions,
        )?;
        Ok(self.pack.final_quiz.clone())
    }

    async fn fetch_review_items(&self) -> Result<Vec<ReviewItem>, ContentFetchError> {
        self.check_failure(ContentKind::Review)?;
        validate_review_items(&self.pack.review_items)?;
        Ok(self.pack.review_items.clone())
    }
}
