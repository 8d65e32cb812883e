//! Civics Quest Game Engine
//!
//! Platform-agnostic core for the Legislative Branch learning game: level and
//! upgrade catalogs, the progression state machine, quiz and review sessions,
//! and the content provider contract. No UI or platform-specific dependencies.

pub mod catalog;
pub mod certificate;
pub mod constants;
pub mod content;
pub mod controller;
pub mod progression;
pub mod rules;
pub mod screen;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use catalog::{
    AvatarUpgrade, Catalog, CatalogError, Level, LevelId, SlotType, UpgradeId, default_catalog,
};
pub use certificate::CertificateSummary;
pub use content::{
    Chamber, ContentFetchError, ContentKind, ContentPack, ContentProvider,
    FixtureContentProvider, LevelContent, Question, ReviewItem,
};
pub use controller::{
    ControllerError, Delivery, FinalQuizProgress, GameController, LevelQuizProgress,
};
pub use progression::{
    ErrorKind, LevelCompletion, LevelEntry, LevelStatus, Progress, ProgressionEngine,
    ProgressionError, WardrobeEntry,
};
pub use rules::{QuizRules, RulesError, RulesLoadError};
pub use screen::{
    ActiveScreen, ActivityScreen, FetchPayload, FetchRequest, FetchResponse, FetchTicket,
};
pub use session::{
    Bucket, FinalQuizSession, FinalQuizStep, LevelQuizPhase, LevelQuizSession, LevelQuizStep,
    OptionFeedback, ReviewFeedback, ReviewSession, SessionError,
};
pub use state::{EquippedUpgrades, GameState, GameView};

use std::sync::Arc;

/// Engine over the bundled catalog and rules.
#[must_use]
pub fn default_engine() -> ProgressionEngine {
    ProgressionEngine::new(
        Arc::new(default_catalog().clone()),
        QuizRules::load_from_static(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_engine_uses_bundled_data() {
        let engine = default_engine();
        assert_eq!(engine.catalog().level_count(), 6);
        assert_eq!(engine.catalog().upgrades().len(), 5);
        assert_eq!(engine.rules(), &QuizRules::builtin());
    }

    #[test]
    fn fresh_controller_starts_at_name_entry() {
        let controller = GameController::new(default_engine());
        assert_eq!(controller.state().current_view(), GameView::NameEntry);
        assert!(controller.screen().is_none());
    }
}
