//! Static level and avatar-upgrade catalogs.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::FIRST_LEVEL_ID;

const DEFAULT_LEVELS_DATA: &str = include_str!("../../static/assets/data/levels.json");
const DEFAULT_UPGRADES_DATA: &str = include_str!("../../static/assets/data/upgrades.json");

/// Stable identifier of a catalog level. IDs run `1..=N` without gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(pub u32);

impl LevelId {
    pub const FIRST: Self = Self(FIRST_LEVEL_ID);

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LevelId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Stable identifier of an avatar upgrade.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeId(String);

impl UpgradeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UpgradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UpgradeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Avatar customization slot. At most one upgrade per slot may be equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotType {
    Headwear,
    Eyewear,
    Accessory,
}

impl SlotType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Headwear => "headwear",
            Self::Eyewear => "eyewear",
            Self::Accessory => "accessory",
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lesson in the level catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub title: String,
    /// Prompt handed to the content provider when the level is opened.
    pub topic: String,
}

/// A cosmetic reward awarded on level completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarUpgrade {
    pub id: UpgradeId,
    pub name: String,
    pub slot: SlotType,
    /// Opaque handle resolved by the presentation layer.
    pub asset: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LevelsFile {
    levels: Vec<Level>,
}

#[derive(Debug, Clone, Deserialize)]
struct UpgradesFile {
    upgrades: Vec<AvatarUpgrade>,
}

/// Errors raised when catalog data violates its shape rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("level catalog is empty")]
    NoLevels,
    #[error("level at position {position} has id {found}, expected {expected}")]
    NonSequentialLevel {
        position: usize,
        expected: LevelId,
        found: LevelId,
    },
    #[error("upgrade at position {position} has an empty id")]
    EmptyUpgradeId { position: usize },
    #[error("upgrade id `{0}` appears more than once")]
    DuplicateUpgrade(UpgradeId),
    #[error("catalog data could not be parsed: {0}")]
    Parse(String),
}

/// Immutable level and upgrade tables, indexed by stable ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    levels: Vec<Level>,
    upgrades: Vec<AvatarUpgrade>,
}

impl Catalog {
    /// Build a catalog, validating the level sequence and upgrade IDs.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if there are no levels, level IDs are not
    /// `1..=N` in order, or upgrade IDs are empty or repeated.
    pub fn new(levels: Vec<Level>, upgrades: Vec<AvatarUpgrade>) -> Result<Self, CatalogError> {
        if levels.is_empty() {
            return Err(CatalogError::NoLevels);
        }
        let mut expected = LevelId::FIRST;
        for (position, level) in levels.iter().enumerate() {
            if level.id != expected {
                return Err(CatalogError::NonSequentialLevel {
                    position,
                    expected,
                    found: level.id,
                });
            }
            expected = expected.next();
        }

        let mut seen = HashSet::new();
        for (position, upgrade) in upgrades.iter().enumerate() {
            if upgrade.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyUpgradeId { position });
            }
            if !seen.insert(upgrade.id.clone()) {
                return Err(CatalogError::DuplicateUpgrade(upgrade.id.clone()));
            }
        }

        Ok(Self { levels, upgrades })
    }

    /// Parse catalog tables from their JSON documents.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON and the validation
    /// errors of [`Catalog::new`] otherwise.
    pub fn from_json(levels_json: &str, upgrades_json: &str) -> Result<Self, CatalogError> {
        let levels: LevelsFile =
            serde_json::from_str(levels_json).map_err(|err| CatalogError::Parse(err.to_string()))?;
        let upgrades: UpgradesFile = serde_json::from_str(upgrades_json)
            .map_err(|err| CatalogError::Parse(err.to_string()))?;
        Self::new(levels.levels, upgrades.upgrades)
    }

    /// Load the bundled reference catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled assets are malformed.
    pub fn load_from_static() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_LEVELS_DATA, DEFAULT_UPGRADES_DATA)
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[must_use]
    pub fn upgrades(&self) -> &[AvatarUpgrade] {
        &self.upgrades
    }

    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn level(&self, id: LevelId) -> Option<&Level> {
        let index = usize::try_from(id.get().checked_sub(FIRST_LEVEL_ID)?).ok()?;
        self.levels.get(index)
    }

    #[must_use]
    pub fn contains_level(&self, id: LevelId) -> bool {
        self.level(id).is_some()
    }

    #[must_use]
    pub fn upgrade(&self, id: &UpgradeId) -> Option<&AvatarUpgrade> {
        self.upgrades.iter().find(|upgrade| &upgrade.id == id)
    }

    /// Upgrade awarded for the `completed_before`-th completion. Awards cycle
    /// through the catalog in order.
    #[must_use]
    pub fn award_for(&self, completed_before: usize) -> Option<&AvatarUpgrade> {
        if self.upgrades.is_empty() {
            return None;
        }
        self.upgrades.get(completed_before % self.upgrades.len())
    }

    pub fn level_ids(&self) -> impl Iterator<Item = LevelId> + '_ {
        self.levels.iter().map(|level| level.id)
    }
}

/// Process-wide reference catalog loaded from the bundled assets.
///
/// # Panics
///
/// Panics if the bundled catalog assets are malformed, which the data-shape
/// tests rule out.
#[must_use]
pub fn default_catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        Catalog::load_from_static().unwrap_or_else(|err| panic!("bundled catalog invalid: {err}"))
    })
}
