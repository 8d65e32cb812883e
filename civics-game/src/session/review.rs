//! Drag-and-drop review: sort facts into House, Senate or Both.
use serde::{Deserialize, Serialize};
use std::fmt;

use super::SessionError;
use crate::constants::LOG_TARGET_SESSION;
use crate::content::{Chamber, ReviewItem};

/// Where a review item currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    #[default]
    Unassigned,
    House,
    Senate,
    Both,
}

impl Bucket {
    pub const ALL: [Self; 4] = [Self::Unassigned, Self::House, Self::Senate, Self::Both];

    #[must_use]
    pub const fn chamber(self) -> Option<Chamber> {
        match self {
            Self::Unassigned => None,
            Self::House => Some(Chamber::House),
            Self::Senate => Some(Chamber::Senate),
            Self::Both => Some(Chamber::Both),
        }
    }
}

impl From<Chamber> for Bucket {
    fn from(chamber: Chamber) -> Self {
        match chamber {
            Chamber::House => Self::House,
            Chamber::Senate => Self::Senate,
            Chamber::Both => Self::Both,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chamber() {
            Some(chamber) => chamber.fmt(f),
            None => f.write_str("Unassigned"),
        }
    }
}

/// Per-item result of checking the placements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFeedback {
    /// `results[i]` is whether item `i` sits in its true chamber.
    pub results: Vec<bool>,
    pub correct: usize,
}

impl ReviewFeedback {
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSession {
    items: Vec<ReviewItem>,
    // One bucket per item, so an item can never be in two places.
    placements: Vec<Bucket>,
    feedback: Option<ReviewFeedback>,
}

impl ReviewSession {
    /// # Errors
    ///
    /// [`SessionError::NoItems`] for an empty item list.
    pub fn new(items: Vec<ReviewItem>) -> Result<Self, SessionError> {
        if items.is_empty() {
            return Err(SessionError::NoItems);
        }
        let placements = vec![Bucket::Unassigned; items.len()];
        Ok(Self {
            items,
            placements,
            feedback: None,
        })
    }

    #[must_use]
    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    #[must_use]
    pub fn bucket_of(&self, item: usize) -> Option<Bucket> {
        self.placements.get(item).copied()
    }

    /// Indices of the items in `bucket`, in item order.
    #[must_use]
    pub fn items_in(&self, bucket: Bucket) -> Vec<usize> {
        self.placements
            .iter()
            .enumerate()
            .filter(|(_, placed)| **placed == bucket)
            .map(|(index, _)| index)
            .collect()
    }

    #[must_use]
    pub fn unassigned(&self) -> usize {
        self.placements
            .iter()
            .filter(|placed| **placed == Bucket::Unassigned)
            .count()
    }

    #[must_use]
    pub fn can_check(&self) -> bool {
        self.feedback.is_none() && self.unassigned() == 0
    }

    #[must_use]
    pub const fn feedback(&self) -> Option<&ReviewFeedback> {
        self.feedback.as_ref()
    }

    /// Put `item` into `target`, taking it out of wherever it was.
    ///
    /// # Errors
    ///
    /// Fails for an unknown item or once answers have been checked.
    pub fn move_item(&mut self, item: usize, target: Bucket) -> Result<(), SessionError> {
        if self.feedback.is_some() {
            return Err(SessionError::AlreadyChecked);
        }
        let placed = self
            .placements
            .get_mut(item)
            .ok_or(SessionError::UnknownItem(item))?;
        *placed = target;
        Ok(())
    }

    /// Compare every placement against the item's true chamber.
    ///
    /// # Errors
    ///
    /// Fails while items are unassigned or if already checked.
    pub fn check(&mut self) -> Result<&ReviewFeedback, SessionError> {
        if self.feedback.is_some() {
            return Err(SessionError::AlreadyChecked);
        }
        let remaining = self.unassigned();
        if remaining > 0 {
            return Err(SessionError::ItemsUnassigned { remaining });
        }
        let results: Vec<bool> = self
            .items
            .iter()
            .zip(&self.placements)
            .map(|(item, placed)| placed.chamber() == Some(item.category))
            .collect();
        let correct = results.iter().filter(|ok| **ok).count();
        log::debug!(target: LOG_TARGET_SESSION, "review checked {correct}/{}", results.len());
        Ok(&*self.feedback.insert(ReviewFeedback { results, correct }))
    }

    /// # Errors
    ///
    /// [`SessionError::NotChecked`] before the answers are checked.
    pub fn finish(&self) -> Result<&ReviewFeedback, SessionError> {
        self.feedback.as_ref().ok_or(SessionError::NotChecked)
    }
}
