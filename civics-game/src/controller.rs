//! Single owner of the learner's [`GameState`].
//!
//! The controller applies progression operations, keeps the open activity
//! screen and its fetch ticket, and routes quiz outcomes back into the
//! engine. State is only replaced when an operation succeeds.
use thiserror::Error;

use crate::catalog::{AvatarUpgrade, LevelId, UpgradeId};
use crate::certificate::CertificateSummary;
use crate::constants::LOG_TARGET_CONTROLLER;
use crate::content::ContentKind;
use crate::progression::{ProgressionEngine, ProgressionError};
use crate::screen::{
    ActiveScreen, ActivityScreen, FetchPayload, FetchRequest, FetchResponse, FetchTicket,
};
use crate::session::{
    Bucket, FinalQuizSession, FinalQuizStep, LevelQuizSession, LevelQuizStep, ReviewFeedback,
    ReviewSession, SessionError,
};
use crate::state::GameState;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("no {0} screen is open")]
    NoScreen(ContentKind),
    #[error("{0} is not ready")]
    NotReady(ContentKind),
    #[error("there is no failed fetch to retry")]
    NothingToRetry,
}

/// What happened to a delivered fetch response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    /// The ticket no longer matches the open screen.
    Discarded,
}

/// Result of moving past a graded level-quiz question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelQuizProgress {
    Advanced { index: usize },
    Failed { score: usize },
    Completed {
        level: LevelId,
        score: usize,
        awarded: Option<AvatarUpgrade>,
        unlocked: Option<LevelId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalQuizProgress {
    Advanced { index: usize },
    Certified(CertificateSummary),
}

#[derive(Debug, Clone)]
pub struct GameController {
    engine: ProgressionEngine,
    state: GameState,
    screen: Option<ActiveScreen>,
    last_ticket: FetchTicket,
}

impl GameController {
    #[must_use]
    pub fn new(engine: ProgressionEngine) -> Self {
        Self {
            engine,
            state: GameState::default(),
            screen: None,
            last_ticket: FetchTicket::default(),
        }
    }

    #[must_use]
    pub const fn engine(&self) -> &ProgressionEngine {
        &self.engine
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn screen(&self) -> Option<&ActiveScreen> {
        self.screen.as_ref()
    }

    #[must_use]
    pub fn level_quiz(&self) -> Option<&LevelQuizSession> {
        match &self.screen {
            Some(ActiveScreen::Level { screen, .. }) => screen.ready(),
            _ => None,
        }
    }

    #[must_use]
    pub fn review(&self) -> Option<&ReviewSession> {
        match &self.screen {
            Some(ActiveScreen::Review(screen)) => screen.ready(),
            _ => None,
        }
    }

    #[must_use]
    pub fn final_quiz(&self) -> Option<&FinalQuizSession> {
        match &self.screen {
            Some(ActiveScreen::FinalQuiz(screen)) => screen.ready(),
            _ => None,
        }
    }

    #[must_use]
    pub fn certificate(&self) -> Option<CertificateSummary> {
        CertificateSummary::from_state(&self.engine, &self.state)
    }

    fn issue_ticket(&mut self) -> FetchTicket {
        self.last_ticket = self.last_ticket.successor();
        self.last_ticket
    }

    /// # Errors
    ///
    /// Propagates [`ProgressionError`] from the engine.
    pub fn submit_name(&mut self, name: &str) -> Result<(), ControllerError> {
        self.state = self.engine.submit_name(&self.state, name)?;
        Ok(())
    }

    /// Enter a level and request its lesson and quiz.
    ///
    /// # Errors
    ///
    /// Propagates [`ProgressionError`] for locked, completed or unknown levels.
    pub fn start_level(&mut self, level: LevelId) -> Result<FetchRequest, ControllerError> {
        let next = self.engine.start_level(&self.state, level)?;
        let request = self.level_request(level)?;
        self.state = next;
        self.screen = Some(ActiveScreen::Level {
            level,
            screen: ActivityScreen::Loading {
                ticket: request.ticket(),
            },
        });
        log::debug!(target: LOG_TARGET_CONTROLLER, "fetching level {level} as {}", request.ticket());
        Ok(request)
    }

    fn level_request(&mut self, level: LevelId) -> Result<FetchRequest, ControllerError> {
        let entry = self
            .engine
            .catalog()
            .level(level)
            .ok_or(ProgressionError::UnknownLevel(level))?;
        let (topic, title) = (entry.topic.clone(), entry.title.clone());
        Ok(FetchRequest::Level {
            ticket: self.issue_ticket(),
            level,
            topic,
            title,
        })
    }

    /// Leave the open level without completing it.
    ///
    /// # Errors
    ///
    /// Propagates [`ProgressionError::WrongView`] when no level is open.
    pub fn leave_level(&mut self) -> Result<(), ControllerError> {
        self.state = self.engine.abandon_level(&self.state)?;
        self.screen = None;
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates [`ProgressionError`] for unknown or unearned upgrades.
    pub fn toggle_upgrade(&mut self, upgrade: &UpgradeId) -> Result<(), ControllerError> {
        self.state = self.engine.toggle_upgrade(&self.state, upgrade)?;
        Ok(())
    }

    /// Open the review activity and request its items.
    ///
    /// # Errors
    ///
    /// Propagates [`ProgressionError::ReviewLocked`] while levels remain.
    pub fn start_review(&mut self) -> Result<FetchRequest, ControllerError> {
        self.state = self.engine.start_review_activity(&self.state)?;
        let ticket = self.issue_ticket();
        self.screen = Some(ActiveScreen::Review(ActivityScreen::Loading { ticket }));
        Ok(FetchRequest::Review { ticket })
    }

    /// Hand a finished fetch back. Responses for screens that have since
    /// closed or been remounted are dropped. Payloads that do not match the
    /// quiz rules fail the screen like a transport error.
    pub fn deliver(&mut self, response: FetchResponse) -> Delivery {
        let FetchResponse { ticket, payload } = response;
        let Some(screen) = self.screen.as_mut() else {
            log::warn!(target: LOG_TARGET_CONTROLLER, "discarding fetch {ticket}: no screen open");
            return Delivery::Discarded;
        };
        if screen.pending_ticket() != Some(ticket) {
            log::warn!(target: LOG_TARGET_CONTROLLER, "discarding stale fetch {ticket}");
            return Delivery::Discarded;
        }
        let rules = *self.engine.rules();
        let payload = payload.and_then(|payload| payload.validate(&rules).map(|()| payload));
        let applied = match (screen, payload) {
            (ActiveScreen::Level { level, screen }, Ok(FetchPayload::Level { level: fetched, content }))
                if *level == fetched =>
            {
                *screen = ready_or_failed(
                    ticket,
                    ContentKind::Level,
                    LevelQuizSession::new(fetched, content, &rules),
                );
                true
            }
            (ActiveScreen::Review(screen), Ok(FetchPayload::Review(items))) => {
                *screen = ready_or_failed(ticket, ContentKind::Review, ReviewSession::new(items));
                true
            }
            (ActiveScreen::FinalQuiz(screen), Ok(FetchPayload::FinalQuiz(questions))) => {
                *screen = ready_or_failed(
                    ticket,
                    ContentKind::FinalQuiz,
                    FinalQuizSession::new(questions),
                );
                true
            }
            (screen, Err(err)) => {
                log::warn!(target: LOG_TARGET_CONTROLLER, "fetch {ticket} failed: {err}");
                let message = err.retry_message().to_string();
                match screen {
                    ActiveScreen::Level { screen, .. } => {
                        *screen = ActivityScreen::Failed { ticket, message };
                    }
                    ActiveScreen::Review(screen) => {
                        *screen = ActivityScreen::Failed { ticket, message };
                    }
                    ActiveScreen::FinalQuiz(screen) => {
                        *screen = ActivityScreen::Failed { ticket, message };
                    }
                }
                true
            }
            (_, Ok(_)) => false,
        };
        if applied {
            Delivery::Applied
        } else {
            log::warn!(
                target: LOG_TARGET_CONTROLLER,
                "discarding fetch {ticket}: payload does not fit the open screen"
            );
            Delivery::Discarded
        }
    }

    /// Remount a failed screen with a fresh fetch.
    ///
    /// # Errors
    ///
    /// [`ControllerError::NothingToRetry`] unless the open screen failed.
    pub fn retry_fetch(&mut self) -> Result<FetchRequest, ControllerError> {
        let Some(screen) = &self.screen else {
            return Err(ControllerError::NothingToRetry);
        };
        if screen.failure().is_none() {
            return Err(ControllerError::NothingToRetry);
        }
        let request = match screen {
            ActiveScreen::Level { level, .. } => {
                let level = *level;
                let request = self.level_request(level)?;
                self.screen = Some(ActiveScreen::Level {
                    level,
                    screen: ActivityScreen::Loading {
                        ticket: request.ticket(),
                    },
                });
                request
            }
            ActiveScreen::Review(_) => {
                let ticket = self.issue_ticket();
                self.screen = Some(ActiveScreen::Review(ActivityScreen::Loading { ticket }));
                FetchRequest::Review { ticket }
            }
            ActiveScreen::FinalQuiz(_) => {
                let ticket = self.issue_ticket();
                self.screen = Some(ActiveScreen::FinalQuiz(ActivityScreen::Loading { ticket }));
                FetchRequest::FinalQuiz { ticket }
            }
        };
        log::debug!(target: LOG_TARGET_CONTROLLER, "retrying {} as {}", request.kind(), request.ticket());
        Ok(request)
    }

    fn level_quiz_mut(&mut self) -> Result<&mut LevelQuizSession, ControllerError> {
        match &mut self.screen {
            Some(ActiveScreen::Level { screen, .. }) => screen
                .ready_mut()
                .ok_or(ControllerError::NotReady(ContentKind::Level)),
            _ => Err(ControllerError::NoScreen(ContentKind::Level)),
        }
    }

    fn review_mut(&mut self) -> Result<&mut ReviewSession, ControllerError> {
        match &mut self.screen {
            Some(ActiveScreen::Review(screen)) => screen
                .ready_mut()
                .ok_or(ControllerError::NotReady(ContentKind::Review)),
            _ => Err(ControllerError::NoScreen(ContentKind::Review)),
        }
    }

    fn final_quiz_mut(&mut self) -> Result<&mut FinalQuizSession, ControllerError> {
        match &mut self.screen {
            Some(ActiveScreen::FinalQuiz(screen)) => screen
                .ready_mut()
                .ok_or(ControllerError::NotReady(ContentKind::FinalQuiz)),
            _ => Err(ControllerError::NoScreen(ContentKind::FinalQuiz)),
        }
    }

    /// # Errors
    ///
    /// Fails without a ready level quiz or for an option the question lacks.
    pub fn select_answer(&mut self, option: &str) -> Result<(), ControllerError> {
        Ok(self.level_quiz_mut()?.select(option)?)
    }

    /// # Errors
    ///
    /// Fails without a ready level quiz or a selection.
    pub fn submit_answer(&mut self) -> Result<bool, ControllerError> {
        Ok(self.level_quiz_mut()?.submit()?)
    }

    /// Move past the graded question; a passing attempt completes the level.
    ///
    /// # Errors
    ///
    /// Session ordering errors, or a [`ProgressionError`] if the level can no
    /// longer be completed. Either way nothing changes.
    pub fn next_question(&mut self) -> Result<LevelQuizProgress, ControllerError> {
        let mut quiz = self.level_quiz_mut()?.clone();
        let level = quiz.level();
        match quiz.next()? {
            LevelQuizStep::Advanced { index } => {
                *self.level_quiz_mut()? = quiz;
                Ok(LevelQuizProgress::Advanced { index })
            }
            LevelQuizStep::Failed { score } => {
                log::info!(target: LOG_TARGET_CONTROLLER, "level {level} quiz failed with {score}");
                *self.level_quiz_mut()? = quiz;
                Ok(LevelQuizProgress::Failed { score })
            }
            LevelQuizStep::Passed { score } => {
                let completion = self.engine.complete_level(&self.state, level)?;
                self.state = completion.state;
                self.screen = None;
                Ok(LevelQuizProgress::Completed {
                    level,
                    score,
                    awarded: completion.awarded,
                    unlocked: completion.unlocked,
                })
            }
        }
    }

    /// # Errors
    ///
    /// [`SessionError::NotFailed`] unless the last attempt failed.
    pub fn retry_level_quiz(&mut self) -> Result<(), ControllerError> {
        Ok(self.level_quiz_mut()?.retry()?)
    }

    /// # Errors
    ///
    /// Fails without a ready review or for an unknown item.
    pub fn move_review_item(&mut self, item: usize, target: Bucket) -> Result<(), ControllerError> {
        Ok(self.review_mut()?.move_item(item, target)?)
    }

    /// # Errors
    ///
    /// Fails while items are unassigned.
    pub fn check_review(&mut self) -> Result<ReviewFeedback, ControllerError> {
        Ok(self.review_mut()?.check()?.clone())
    }

    /// Leave the checked review for the final quiz and request its questions.
    ///
    /// # Errors
    ///
    /// Fails before the answers have been checked.
    pub fn finish_review(&mut self) -> Result<FetchRequest, ControllerError> {
        let correct = self.review_mut()?.finish()?.correct;
        self.state = self.engine.complete_review_activity(&self.state)?;
        let ticket = self.issue_ticket();
        self.screen = Some(ActiveScreen::FinalQuiz(ActivityScreen::Loading { ticket }));
        log::debug!(
            target: LOG_TARGET_CONTROLLER,
            "review finished with {correct} correct placements"
        );
        Ok(FetchRequest::FinalQuiz { ticket })
    }

    /// # Errors
    ///
    /// Fails without a ready final quiz or when the question was answered.
    pub fn answer_final_question(&mut self, option: &str) -> Result<bool, ControllerError> {
        Ok(self.final_quiz_mut()?.answer(option)?)
    }

    /// Move on; after the last question the tally is recorded and the
    /// certificate shown.
    ///
    /// # Errors
    ///
    /// Session ordering errors or a rejected final score.
    pub fn next_final_question(&mut self) -> Result<FinalQuizProgress, ControllerError> {
        let mut quiz = self.final_quiz_mut()?.clone();
        match quiz.next()? {
            FinalQuizStep::Advanced { index } => {
                *self.final_quiz_mut()? = quiz;
                Ok(FinalQuizProgress::Advanced { index })
            }
            FinalQuizStep::Finished { score } => {
                self.state = self.engine.complete_final_quiz(&self.state, score)?;
                self.screen = None;
                self.certificate()
                    .map(FinalQuizProgress::Certified)
                    .ok_or(ControllerError::NoScreen(ContentKind::FinalQuiz))
            }
        }
    }

    /// # Errors
    ///
    /// Propagates [`ProgressionError::WrongView`] unless the certificate is showing.
    pub fn play_again(&mut self) -> Result<(), ControllerError> {
        self.state = self.engine.reset_for_replay(&self.state)?;
        self.screen = None;
        Ok(())
    }
}

fn ready_or_failed<T>(
    ticket: FetchTicket,
    kind: ContentKind,
    session: Result<T, SessionError>,
) -> ActivityScreen<T> {
    match session {
        Ok(session) => ActivityScreen::Ready(session),
        Err(err) => {
            log::warn!(target: LOG_TARGET_CONTROLLER, "{kind} content unusable: {err}");
            ActivityScreen::Failed {
                ticket,
                message: kind.retry_message().to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::content::{Chamber, FixtureContentProvider, LevelContent, Question, ReviewItem};
    use crate::rules::QuizRules;
    use crate::state::GameView;
    use std::sync::Arc;

    fn controller() -> GameController {
        let engine =
            ProgressionEngine::new(Arc::new(default_catalog().clone()), QuizRules::builtin());
        let mut controller = GameController::new(engine);
        controller.submit_name("Ada").unwrap();
        controller
    }

    fn level_payload(level: LevelId) -> FetchPayload {
        let question = Question {
            question: "Q".into(),
            options: vec!["a".into(), "b".into()],
            correct_answer: "a".into(),
        };
        FetchPayload::Level {
            level,
            content: LevelContent {
                content: "lesson".into(),
                questions: vec![question; 3],
            },
        }
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut game = controller();
        let first = game.start_level(LevelId(1)).unwrap();
        game.leave_level().unwrap();
        let second = game.start_level(LevelId(1)).unwrap();
        assert_ne!(first.ticket(), second.ticket());

        let stale = FetchResponse {
            ticket: first.ticket(),
            payload: Ok(level_payload(LevelId(1))),
        };
        assert_eq!(game.deliver(stale), Delivery::Discarded);
        assert!(game.screen().is_some_and(ActiveScreen::is_loading));

        let fresh = FetchResponse {
            ticket: second.ticket(),
            payload: Ok(level_payload(LevelId(1))),
        };
        assert_eq!(game.deliver(fresh), Delivery::Applied);
        assert!(game.level_quiz().is_some());
    }

    #[test]
    fn leaving_a_level_drops_its_pending_fetch() {
        let mut game = controller();
        let request = game.start_level(LevelId(1)).unwrap();
        game.leave_level().unwrap();
        let response = FetchResponse {
            ticket: request.ticket(),
            payload: Ok(level_payload(LevelId(1))),
        };
        assert_eq!(game.deliver(response), Delivery::Discarded);
        assert_eq!(game.state().current_view(), GameView::GameScreen);
    }

    #[tokio::test]
    async fn failed_fetch_offers_retry_without_touching_state() {
        let provider = FixtureContentProvider::load_from_static();
        provider.fail_next(ContentKind::Level, 1);
        let mut game = controller();

        let request = game.start_level(LevelId(1)).unwrap();
        let before = game.state().clone();
        assert_eq!(game.deliver(request.run(&provider).await), Delivery::Applied);
        assert_eq!(
            game.screen().and_then(ActiveScreen::failure),
            Some("Failed to load level content. Please try again.")
        );
        assert_eq!(game.state(), &before);
        assert_eq!(
            game.select_answer("x"),
            Err(ControllerError::NotReady(ContentKind::Level))
        );

        let retry = game.retry_fetch().unwrap();
        assert_eq!(game.deliver(retry.run(&provider).await), Delivery::Applied);
        assert!(game.level_quiz().is_some());
        assert_eq!(game.retry_fetch(), Err(ControllerError::NothingToRetry));
    }

    #[test]
    fn passing_quiz_completes_the_level() {
        let mut game = controller();
        let request = game.start_level(LevelId(1)).unwrap();
        game.deliver(FetchResponse {
            ticket: request.ticket(),
            payload: Ok(level_payload(LevelId(1))),
        });

        let mut outcome = None;
        for _ in 0..3 {
            game.select_answer("a").unwrap();
            assert!(game.submit_answer().unwrap());
            outcome = Some(game.next_question().unwrap());
        }
        let Some(LevelQuizProgress::Completed {
            level,
            score,
            awarded,
            unlocked,
        }) = outcome
        else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!((level, score), (LevelId(1), 3));
        assert_eq!(awarded.map(|u| u.id), Some(UpgradeId::from("top_hat")));
        assert_eq!(unlocked, Some(LevelId(2)));
        assert!(game.screen().is_none());
        assert_eq!(game.state().current_view(), GameView::GameScreen);
    }

    #[test]
    fn failing_quiz_stays_on_the_level() {
        let mut game = controller();
        let request = game.start_level(LevelId(1)).unwrap();
        game.deliver(FetchResponse {
            ticket: request.ticket(),
            payload: Ok(level_payload(LevelId(1))),
        });
        for _ in 0..3 {
            game.select_answer("b").unwrap();
            game.submit_answer().unwrap();
            game.next_question().unwrap();
        }
        assert_eq!(game.state().current_view(), GameView::Level);
        assert!(game.state().completed_levels().is_empty());
        game.retry_level_quiz().unwrap();
        assert_eq!(game.level_quiz().map(LevelQuizSession::score), Some(0));
    }

    fn question() -> Question {
        Question {
            question: "Q".into(),
            options: vec!["a".into(), "b".into()],
            correct_answer: "a".into(),
        }
    }

    fn pass_every_level(game: &mut GameController) {
        let levels: Vec<LevelId> = game.engine().catalog().level_ids().collect();
        for level in levels {
            let request = game.start_level(level).unwrap();
            game.deliver(FetchResponse {
                ticket: request.ticket(),
                payload: Ok(level_payload(level)),
            });
            for _ in 0..3 {
                game.select_answer("a").unwrap();
                game.submit_answer().unwrap();
                game.next_question().unwrap();
            }
        }
    }

    fn open_final_quiz(game: &mut GameController) -> FetchRequest {
        pass_every_level(game);
        let request = game.start_review().unwrap();
        let items = vec![ReviewItem {
            content: "Impeaches officials".into(),
            category: Chamber::House,
        }];
        game.deliver(FetchResponse {
            ticket: request.ticket(),
            payload: Ok(FetchPayload::Review(items)),
        });
        game.move_review_item(0, Bucket::House).unwrap();
        game.check_review().unwrap();
        game.finish_review().unwrap()
    }

    #[test]
    fn short_level_quiz_fails_the_screen_and_can_be_retried() {
        let mut game = controller();
        let request = game.start_level(LevelId(1)).unwrap();
        let short = FetchPayload::Level {
            level: LevelId(1),
            content: LevelContent {
                content: "lesson".into(),
                questions: vec![question(); 2],
            },
        };
        let delivery = game.deliver(FetchResponse {
            ticket: request.ticket(),
            payload: Ok(short),
        });
        assert_eq!(delivery, Delivery::Applied);
        assert!(game.level_quiz().is_none());
        assert_eq!(
            game.screen().and_then(ActiveScreen::failure),
            Some(ContentKind::Level.retry_message())
        );

        let retry = game.retry_fetch().unwrap();
        game.deliver(FetchResponse {
            ticket: retry.ticket(),
            payload: Ok(level_payload(LevelId(1))),
        });
        assert_eq!(game.level_quiz().map(LevelQuizSession::question_count), Some(3));
    }

    #[test]
    fn oversized_final_quiz_fails_the_screen_and_can_be_retried() {
        let mut game = controller();
        let request = open_final_quiz(&mut game);
        assert_eq!(game.state().current_view(), GameView::Quiz);

        let delivery = game.deliver(FetchResponse {
            ticket: request.ticket(),
            payload: Ok(FetchPayload::FinalQuiz(vec![question(); 11])),
        });
        assert_eq!(delivery, Delivery::Applied);
        assert!(game.final_quiz().is_none());
        assert_eq!(
            game.screen().and_then(ActiveScreen::failure),
            Some(ContentKind::FinalQuiz.retry_message())
        );

        let retry = game.retry_fetch().unwrap();
        game.deliver(FetchResponse {
            ticket: retry.ticket(),
            payload: Ok(FetchPayload::FinalQuiz(vec![question(); 10])),
        });
        let mut certified = None;
        for _ in 0..10 {
            game.answer_final_question("a").unwrap();
            if let FinalQuizProgress::Certified(summary) = game.next_final_question().unwrap() {
                certified = Some(summary);
            }
        }
        assert_eq!(certified.map(|c| (c.score, c.total)), Some((10, 10)));
        assert_eq!(game.state().current_view(), GameView::Certificate);
    }

    #[test]
    fn review_is_locked_until_every_level_is_done() {
        let mut game = controller();
        let err = game.start_review().unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Progression(ProgressionError::ReviewLocked { .. })
        ));
        assert!(game.screen().is_none());
    }
}
