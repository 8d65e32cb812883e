use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::catalog::{LevelId, UpgradeId};

/// Screens of the progression state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameView {
    #[default]
    NameEntry,
    GameScreen,
    Level,
    DragAndDropReview,
    Quiz,
    Certificate,
}

impl GameView {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameEntry => "name_entry",
            Self::GameScreen => "game_screen",
            Self::Level => "level",
            Self::DragAndDropReview => "drag_and_drop_review",
            Self::Quiz => "quiz",
            Self::Certificate => "certificate",
        }
    }

    /// Whether the view graph has an edge from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NameEntry, Self::GameScreen)
                | (Self::GameScreen, Self::Level)
                | (Self::Level, Self::GameScreen)
                | (Self::GameScreen, Self::DragAndDropReview)
                | (Self::DragAndDropReview, Self::Quiz)
                | (Self::Quiz, Self::Certificate)
                | (Self::Certificate, Self::GameScreen)
        )
    }
}

impl fmt::Display for GameView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameView {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name_entry" => Ok(Self::NameEntry),
            "game_screen" => Ok(Self::GameScreen),
            "level" => Ok(Self::Level),
            "drag_and_drop_review" => Ok(Self::DragAndDropReview),
            "quiz" => Ok(Self::Quiz),
            "certificate" => Ok(Self::Certificate),
            _ => Err(()),
        }
    }
}

/// Equipped upgrades; one per slot type keeps this tiny.
pub type EquippedUpgrades = SmallVec<[UpgradeId; 3]>;

/// Cross-screen progress for one learner.
///
/// Fields are only written by [`crate::progression::ProgressionEngine`];
/// everything else reads through the accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) unlocked_levels: BTreeSet<LevelId>,
    pub(crate) completed_levels: BTreeSet<LevelId>,
    /// Award order; repeats are kept.
    pub(crate) earned_upgrades: Vec<UpgradeId>,
    pub(crate) equipped_upgrades: EquippedUpgrades,
    pub(crate) player_name: String,
    pub(crate) current_view: GameView,
    pub(crate) active_level: Option<LevelId>,
    pub(crate) score: usize,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            unlocked_levels: BTreeSet::from([LevelId::FIRST]),
            completed_levels: BTreeSet::new(),
            earned_upgrades: Vec::new(),
            equipped_upgrades: EquippedUpgrades::new(),
            player_name: String::new(),
            current_view: GameView::NameEntry,
            active_level: None,
            score: 0,
        }
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn unlocked_levels(&self) -> &BTreeSet<LevelId> {
        &self.unlocked_levels
    }

    #[must_use]
    pub const fn completed_levels(&self) -> &BTreeSet<LevelId> {
        &self.completed_levels
    }

    #[must_use]
    pub fn earned_upgrades(&self) -> &[UpgradeId] {
        &self.earned_upgrades
    }

    #[must_use]
    pub fn equipped_upgrades(&self) -> &[UpgradeId] {
        &self.equipped_upgrades
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    #[must_use]
    pub const fn current_view(&self) -> GameView {
        self.current_view
    }

    #[must_use]
    pub const fn active_level(&self) -> Option<LevelId> {
        self.active_level
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn is_unlocked(&self, level: LevelId) -> bool {
        self.unlocked_levels.contains(&level)
    }

    #[must_use]
    pub fn is_completed(&self, level: LevelId) -> bool {
        self.completed_levels.contains(&level)
    }

    #[must_use]
    pub fn has_earned(&self, upgrade: &UpgradeId) -> bool {
        self.earned_upgrades.contains(upgrade)
    }

    #[must_use]
    pub fn is_equipped(&self, upgrade: &UpgradeId) -> bool {
        self.equipped_upgrades.contains(upgrade)
    }

    /// Fresh state for another run that keeps the learner's name.
    #[must_use]
    pub(crate) fn replay_of(&self) -> Self {
        Self {
            player_name: self.player_name.clone(),
            current_view: GameView::GameScreen,
            ..Self::default()
        }
    }
}
