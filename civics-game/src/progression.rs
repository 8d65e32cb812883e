//! Progression engine: every legal change to [`GameState`].
//!
//! Each operation takes the current state by reference and returns a new
//! state, so a rejected operation leaves the caller's state untouched.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{AvatarUpgrade, Catalog, Level, LevelId, UpgradeId};
use crate::constants::LOG_TARGET_PROGRESSION;
use crate::rules::QuizRules;
use crate::state::{GameState, GameView};

/// Coarse classification of engine failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed user input; re-prompt.
    Validation,
    /// Operation inconsistent with the current state; a caller bug.
    InvalidLevel,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProgressionError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("final score {score} is outside 0..={total}")]
    ScoreOutOfRange { score: usize, total: usize },
    #[error("cannot {operation} from the {view} view")]
    WrongView {
        operation: &'static str,
        view: GameView,
    },
    #[error("level {0} is not in the catalog")]
    UnknownLevel(LevelId),
    #[error("level {0} is locked")]
    LevelLocked(LevelId),
    #[error("level {0} is already completed")]
    LevelAlreadyCompleted(LevelId),
    #[error("level {requested} is not the active level")]
    LevelNotActive { requested: LevelId },
    #[error("unknown upgrade `{0}`")]
    UnknownUpgrade(UpgradeId),
    #[error("upgrade `{0}` has not been earned")]
    UpgradeNotEarned(UpgradeId),
    #[error("review unlocks after all levels are completed ({completed}/{total})")]
    ReviewLocked { completed: usize, total: usize },
}

impl ProgressionError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName | Self::ScoreOutOfRange { .. } => ErrorKind::Validation,
            Self::WrongView { .. }
            | Self::UnknownLevel(_)
            | Self::LevelLocked(_)
            | Self::LevelAlreadyCompleted(_)
            | Self::LevelNotActive { .. }
            | Self::UnknownUpgrade(_)
            | Self::UpgradeNotEarned(_)
            | Self::ReviewLocked { .. } => ErrorKind::InvalidLevel,
        }
    }
}

/// Result of a successful level completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCompletion {
    pub state: GameState,
    /// Upgrade to announce; `None` only when the upgrade catalog is empty.
    pub awarded: Option<AvatarUpgrade>,
    /// Level newly added to the unlocked set, if any.
    pub unlocked: Option<LevelId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelStatus {
    Locked,
    Available,
    Completed,
}

/// One row of the level map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelEntry<'a> {
    pub level: &'a Level,
    pub status: LevelStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    #[must_use]
    pub fn percent(self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed.min(self.total) * 100 / self.total
        }
    }
}

/// One earned upgrade as shown in the wardrobe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WardrobeEntry<'a> {
    pub upgrade: &'a AvatarUpgrade,
    pub equipped: bool,
}

#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    catalog: Arc<Catalog>,
    rules: QuizRules,
}

impl ProgressionEngine {
    #[must_use]
    pub const fn new(catalog: Arc<Catalog>, rules: QuizRules) -> Self {
        Self { catalog, rules }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn rules(&self) -> &QuizRules {
        &self.rules
    }

    /// Record the learner's name and open the level map.
    ///
    /// # Errors
    ///
    /// [`ProgressionError::EmptyName`] when the trimmed name is empty, or
    /// [`ProgressionError::WrongView`] outside name entry.
    pub fn submit_name(&self, state: &GameState, name: &str) -> Result<GameState, ProgressionError> {
        expect_view(state, GameView::NameEntry, "submit a name")?;
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(rejected(ProgressionError::EmptyName));
        }
        let mut next = state.clone();
        next.player_name = trimmed.to_string();
        next.current_view = GameView::GameScreen;
        log::debug!(target: LOG_TARGET_PROGRESSION, "player `{trimmed}` entered the game");
        Ok(next)
    }

    /// Enter an unlocked, not yet completed level.
    ///
    /// # Errors
    ///
    /// Fails with an [`ErrorKind::InvalidLevel`] error if the level is unknown,
    /// locked, already completed, or the learner is not on the level map.
    pub fn start_level(
        &self,
        state: &GameState,
        level: LevelId,
    ) -> Result<GameState, ProgressionError> {
        expect_view(state, GameView::GameScreen, "start a level")?;
        if !self.catalog.contains_level(level) {
            return Err(rejected(ProgressionError::UnknownLevel(level)));
        }
        if state.is_completed(level) {
            return Err(rejected(ProgressionError::LevelAlreadyCompleted(level)));
        }
        if !state.is_unlocked(level) {
            return Err(rejected(ProgressionError::LevelLocked(level)));
        }
        let mut next = state.clone();
        next.current_view = GameView::Level;
        next.active_level = Some(level);
        log::debug!(target: LOG_TARGET_PROGRESSION, "level {level} started");
        Ok(next)
    }

    /// Mark the active level complete, award the next upgrade in the cycle
    /// and unlock the following level.
    ///
    /// # Errors
    ///
    /// Fails if `level` is not the active level or was already completed.
    pub fn complete_level(
        &self,
        state: &GameState,
        level: LevelId,
    ) -> Result<LevelCompletion, ProgressionError> {
        expect_view(state, GameView::Level, "complete a level")?;
        if state.active_level != Some(level) {
            return Err(rejected(ProgressionError::LevelNotActive { requested: level }));
        }
        if state.is_completed(level) {
            return Err(rejected(ProgressionError::LevelAlreadyCompleted(level)));
        }

        let completed_before = state.completed_levels.len();
        let mut next = state.clone();
        next.completed_levels.insert(level);

        let awarded = self.catalog.award_for(completed_before).cloned();

        let candidate = level.next();
        let unlocked = (self.catalog.contains_level(candidate)
            && next.unlocked_levels.insert(candidate))
        .then_some(candidate);

        if let Some(upgrade) = &awarded {
            next.earned_upgrades.push(upgrade.id.clone());
        }
        next.current_view = GameView::GameScreen;
        next.active_level = None;

        log::info!(
            target: LOG_TARGET_PROGRESSION,
            "level {level} completed ({}/{}), awarded {}",
            next.completed_levels.len(),
            self.catalog.level_count(),
            awarded.as_ref().map_or("nothing", |u| u.id.as_str())
        );
        Ok(LevelCompletion {
            state: next,
            awarded,
            unlocked,
        })
    }

    /// Leave the active level without completing it.
    ///
    /// # Errors
    ///
    /// [`ProgressionError::WrongView`] when no level is open.
    pub fn abandon_level(&self, state: &GameState) -> Result<GameState, ProgressionError> {
        expect_view(state, GameView::Level, "leave a level")?;
        let mut next = state.clone();
        next.current_view = GameView::GameScreen;
        next.active_level = None;
        Ok(next)
    }

    /// Equip or unequip an earned upgrade, keeping one upgrade per slot.
    ///
    /// # Errors
    ///
    /// Fails for unknown or unearned upgrades, and before a name is entered.
    pub fn toggle_upgrade(
        &self,
        state: &GameState,
        upgrade: &UpgradeId,
    ) -> Result<GameState, ProgressionError> {
        if state.current_view == GameView::NameEntry {
            return Err(rejected(ProgressionError::WrongView {
                operation: "change the avatar",
                view: state.current_view,
            }));
        }
        let Some(entry) = self.catalog.upgrade(upgrade) else {
            return Err(rejected(ProgressionError::UnknownUpgrade(upgrade.clone())));
        };
        if !state.has_earned(upgrade) {
            return Err(rejected(ProgressionError::UpgradeNotEarned(upgrade.clone())));
        }

        let mut next = state.clone();
        if next.is_equipped(upgrade) {
            next.equipped_upgrades.retain(|id| id != upgrade);
            log::debug!(target: LOG_TARGET_PROGRESSION, "unequipped {upgrade}");
        } else {
            let slot = entry.slot;
            next.equipped_upgrades
                .retain(|id| self.catalog.upgrade(id).map(|u| u.slot) != Some(slot));
            next.equipped_upgrades.push(upgrade.clone());
            log::debug!(target: LOG_TARGET_PROGRESSION, "equipped {upgrade} in {slot} slot");
        }
        Ok(next)
    }

    /// Open the drag-and-drop review once every level is complete.
    ///
    /// # Errors
    ///
    /// [`ProgressionError::ReviewLocked`] while levels remain.
    pub fn start_review_activity(&self, state: &GameState) -> Result<GameState, ProgressionError> {
        expect_view(state, GameView::GameScreen, "start the review")?;
        if !self.review_unlocked(state) {
            return Err(rejected(ProgressionError::ReviewLocked {
                completed: self.progress(state).completed,
                total: self.catalog.level_count(),
            }));
        }
        let mut next = state.clone();
        next.current_view = GameView::DragAndDropReview;
        log::debug!(target: LOG_TARGET_PROGRESSION, "review activity started");
        Ok(next)
    }

    /// # Errors
    ///
    /// [`ProgressionError::WrongView`] outside the review activity.
    pub fn complete_review_activity(
        &self,
        state: &GameState,
    ) -> Result<GameState, ProgressionError> {
        expect_view(state, GameView::DragAndDropReview, "finish the review")?;
        let mut next = state.clone();
        next.current_view = GameView::Quiz;
        Ok(next)
    }

    /// Record the final quiz tally and show the certificate.
    ///
    /// # Errors
    ///
    /// [`ProgressionError::ScoreOutOfRange`] when the score exceeds the number
    /// of final quiz questions.
    pub fn complete_final_quiz(
        &self,
        state: &GameState,
        final_score: usize,
    ) -> Result<GameState, ProgressionError> {
        expect_view(state, GameView::Quiz, "finish the final quiz")?;
        let total = self.rules.final_quiz_questions;
        if final_score > total {
            return Err(rejected(ProgressionError::ScoreOutOfRange {
                score: final_score,
                total,
            }));
        }
        let mut next = state.clone();
        next.score = final_score;
        next.current_view = GameView::Certificate;
        log::info!(
            target: LOG_TARGET_PROGRESSION,
            "certificate earned by `{}` with {final_score}/{total}",
            next.player_name
        );
        Ok(next)
    }

    /// Start over from the level map, keeping the learner's name.
    ///
    /// # Errors
    ///
    /// [`ProgressionError::WrongView`] unless the certificate is showing.
    pub fn reset_for_replay(&self, state: &GameState) -> Result<GameState, ProgressionError> {
        expect_view(state, GameView::Certificate, "play again")?;
        Ok(state.replay_of())
    }

    #[must_use]
    pub fn review_unlocked(&self, state: &GameState) -> bool {
        self.catalog.level_ids().all(|id| state.is_completed(id))
    }

    #[must_use]
    pub fn progress(&self, state: &GameState) -> Progress {
        let completed = self
            .catalog
            .level_ids()
            .filter(|id| state.is_completed(*id))
            .count();
        Progress {
            completed,
            total: self.catalog.level_count(),
        }
    }

    #[must_use]
    pub fn level_statuses<'a>(&'a self, state: &GameState) -> Vec<LevelEntry<'a>> {
        self.catalog
            .levels()
            .iter()
            .map(|level| {
                let status = if state.is_completed(level.id) {
                    LevelStatus::Completed
                } else if state.is_unlocked(level.id) {
                    LevelStatus::Available
                } else {
                    LevelStatus::Locked
                };
                LevelEntry { level, status }
            })
            .collect()
    }

    /// Earned upgrades in catalog order, each listed once.
    #[must_use]
    pub fn wardrobe<'a>(&'a self, state: &GameState) -> Vec<WardrobeEntry<'a>> {
        self.catalog
            .upgrades()
            .iter()
            .filter(|upgrade| state.has_earned(&upgrade.id))
            .map(|upgrade| WardrobeEntry {
                upgrade,
                equipped: state.is_equipped(&upgrade.id),
            })
            .collect()
    }

    /// Catalog entries for the equipped upgrades, in equip order.
    #[must_use]
    pub fn equipped<'a>(&'a self, state: &GameState) -> Vec<&'a AvatarUpgrade> {
        state
            .equipped_upgrades()
            .iter()
            .filter_map(|id| self.catalog.upgrade(id))
            .collect()
    }
}

fn expect_view(
    state: &GameState,
    expected: GameView,
    operation: &'static str,
) -> Result<(), ProgressionError> {
    if state.current_view == expected {
        Ok(())
    } else {
        Err(rejected(ProgressionError::WrongView {
            operation,
            view: state.current_view,
        }))
    }
}

fn rejected(err: ProgressionError) -> ProgressionError {
    log::warn!(target: LOG_TARGET_PROGRESSION, "rejected: {err}");
    err
}
