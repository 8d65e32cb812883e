//! Certificate of completion.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::progression::ProgressionEngine;
use crate::state::{GameState, GameView};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateSummary {
    pub player_name: String,
    pub score: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent.
    pub percent: usize,
    /// Names of the upgrades the avatar is wearing.
    pub equipped: Vec<String>,
}

impl CertificateSummary {
    /// Summary for a state showing the certificate, `None` otherwise.
    #[must_use]
    pub fn from_state(engine: &ProgressionEngine, state: &GameState) -> Option<Self> {
        if state.current_view() != GameView::Certificate {
            return None;
        }
        let total = engine.rules().final_quiz_questions;
        let score = state.score();
        let percent = if total == 0 {
            0
        } else {
            (score * 100 + total / 2) / total
        };
        Some(Self {
            player_name: state.player_name().to_string(),
            score,
            total,
            percent,
            equipped: engine
                .equipped(state)
                .into_iter()
                .map(|upgrade| upgrade.name.clone())
                .collect(),
        })
    }
}

impl fmt::Display for CertificateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} completed the Legislative Branch quest with {}/{} ({}%)",
            self.player_name, self.score, self.total, self.percent
        )
    }
}
