//! Activity screen lifecycle and fetch bookkeeping.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::LevelId;
use crate::content::payload::{validate_questions, validate_review_items};
use crate::content::{
    ContentFetchError, ContentKind, ContentProvider, LevelContent, Question, ReviewItem,
};
use crate::rules::QuizRules;
use crate::session::{FinalQuizSession, LevelQuizSession, ReviewSession};

/// Identifies one fetch. A response is only applied while its ticket is the
/// one the open screen is waiting on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct FetchTicket(u64);

impl FetchTicket {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn successor(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityScreen<T> {
    Loading { ticket: FetchTicket },
    Failed { ticket: FetchTicket, message: String },
    Ready(T),
}

impl<T> ActivityScreen<T> {
    #[must_use]
    pub const fn pending_ticket(&self) -> Option<FetchTicket> {
        match self {
            Self::Loading { ticket } => Some(*ticket),
            Self::Failed { .. } | Self::Ready(_) => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed { message, .. } => Some(message),
            Self::Loading { .. } | Self::Ready(_) => None,
        }
    }

    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(session) => Some(session),
            Self::Loading { .. } | Self::Failed { .. } => None,
        }
    }

    pub const fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(session) => Some(session),
            Self::Loading { .. } | Self::Failed { .. } => None,
        }
    }
}

/// The activity currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveScreen {
    Level {
        level: LevelId,
        screen: ActivityScreen<LevelQuizSession>,
    },
    Review(ActivityScreen<ReviewSession>),
    FinalQuiz(ActivityScreen<FinalQuizSession>),
}

impl ActiveScreen {
    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        match self {
            Self::Level { .. } => ContentKind::Level,
            Self::Review(_) => ContentKind::Review,
            Self::FinalQuiz(_) => ContentKind::FinalQuiz,
        }
    }

    #[must_use]
    pub const fn pending_ticket(&self) -> Option<FetchTicket> {
        match self {
            Self::Level { screen, .. } => screen.pending_ticket(),
            Self::Review(screen) => screen.pending_ticket(),
            Self::FinalQuiz(screen) => screen.pending_ticket(),
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Level { screen, .. } => screen.failure(),
            Self::Review(screen) => screen.failure(),
            Self::FinalQuiz(screen) => screen.failure(),
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        match self {
            Self::Level { screen, .. } => screen.is_loading(),
            Self::Review(screen) => screen.is_loading(),
            Self::FinalQuiz(screen) => screen.is_loading(),
        }
    }
}

/// A content fetch the caller should run and hand back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Level {
        ticket: FetchTicket,
        level: LevelId,
        topic: String,
        title: String,
    },
    FinalQuiz {
        ticket: FetchTicket,
    },
    Review {
        ticket: FetchTicket,
    },
}

impl FetchRequest {
    #[must_use]
    pub const fn ticket(&self) -> FetchTicket {
        match self {
            Self::Level { ticket, .. } | Self::FinalQuiz { ticket } | Self::Review { ticket } => {
                *ticket
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        match self {
            Self::Level { .. } => ContentKind::Level,
            Self::FinalQuiz { .. } => ContentKind::FinalQuiz,
            Self::Review { .. } => ContentKind::Review,
        }
    }

    /// Perform the fetch. The provider is called exactly once.
    pub async fn run(self, provider: &dyn ContentProvider) -> FetchResponse {
        let ticket = self.ticket();
        let payload = match self {
            Self::Level {
                level,
                topic,
                title,
                ..
            } => provider
                .fetch_level_content(&topic, &title)
                .await
                .map(|content| FetchPayload::Level { level, content }),
            Self::FinalQuiz { .. } => provider
                .fetch_final_quiz()
                .await
                .map(FetchPayload::FinalQuiz),
            Self::Review { .. } => provider
                .fetch_review_items()
                .await
                .map(FetchPayload::Review),
        };
        FetchResponse { ticket, payload }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPayload {
    Level { level: LevelId, content: LevelContent },
    FinalQuiz(Vec<Question>),
    Review(Vec<ReviewItem>),
}

impl FetchPayload {
    /// Check quiz sizes against the rules and item shapes, whatever provider
    /// produced the payload.
    ///
    /// # Errors
    ///
    /// [`ContentFetchError::Schema`] for wrong counts or unusable entries.
    pub fn validate(&self, rules: &QuizRules) -> Result<(), ContentFetchError> {
        match self {
            Self::Level { content, .. } => validate_questions(
                ContentKind::Level,
                &content.questions,
                rules.level_quiz_questions,
            ),
            Self::FinalQuiz(questions) => {
                validate_questions(ContentKind::FinalQuiz, questions, rules.final_quiz_questions)
            }
            Self::Review(items) => validate_review_items(items),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub ticket: FetchTicket,
    pub payload: Result<FetchPayload, ContentFetchError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FixtureContentProvider;

    #[test]
    fn tickets_advance() {
        let first = FetchTicket::default();
        assert_eq!(first.successor().get(), 1);
        assert_eq!(first.successor().to_string(), "#1");
    }

    #[test]
    fn screen_accessors_follow_the_variant() {
        let loading: ActivityScreen<u8> = ActivityScreen::Loading {
            ticket: FetchTicket(3),
        };
        assert_eq!(loading.pending_ticket(), Some(FetchTicket(3)));
        assert!(loading.ready().is_none());

        let failed: ActivityScreen<u8> = ActivityScreen::Failed {
            ticket: FetchTicket(3),
            message: "try again".into(),
        };
        assert_eq!(failed.failure(), Some("try again"));
        assert_eq!(failed.pending_ticket(), None);

        let mut ready = ActivityScreen::Ready(7_u8);
        if let Some(value) = ready.ready_mut() {
            *value += 1;
        }
        assert_eq!(ready.ready(), Some(&8));
    }

    #[tokio::test]
    async fn requests_carry_their_ticket_through_the_provider() {
        let provider = FixtureContentProvider::load_from_static();
        provider.fail_next(ContentKind::Review, 1);

        let response = FetchRequest::Review {
            ticket: FetchTicket(9),
        }
        .run(&provider)
        .await;
        assert_eq!(response.ticket, FetchTicket(9));
        assert!(response.payload.is_err());

        let response = FetchRequest::FinalQuiz {
            ticket: FetchTicket(10),
        }
        .run(&provider)
        .await;
        assert!(matches!(response.payload, Ok(FetchPayload::FinalQuiz(ref q)) if q.len() == 10));
    }

    #[test]
    fn payload_sizes_follow_the_rules() {
        let rules = QuizRules::builtin();
        let question = Question {
            question: "Who writes laws?".into(),
            options: vec!["Congress".into(), "Courts".into()],
            correct_answer: "Congress".into(),
        };
        let level = |count| FetchPayload::Level {
            level: LevelId(1),
            content: LevelContent {
                content: "lesson".into(),
                questions: vec![question.clone(); count],
            },
        };
        assert!(level(3).validate(&rules).is_ok());
        assert!(matches!(
            level(1).validate(&rules),
            Err(ContentFetchError::Schema { kind: ContentKind::Level, .. })
        ));
        assert!(FetchPayload::FinalQuiz(vec![question.clone(); 10]).validate(&rules).is_ok());
        assert!(FetchPayload::FinalQuiz(vec![question; 11]).validate(&rules).is_err());
        assert!(FetchPayload::Review(Vec::new()).validate(&rules).is_err());
    }
}
