//! Centralized defaults for the progression and quiz rules.
//!
//! The bundled `rules.json` normally supplies these values; the constants
//! here are the fallback when that asset cannot be parsed.

// Quiz sizing ---------------------------------------------------------------
pub const DEFAULT_LEVEL_QUIZ_QUESTIONS: usize = 3;
pub const DEFAULT_LEVEL_PASS_THRESHOLD: usize = 2;
pub const DEFAULT_FINAL_QUIZ_QUESTIONS: usize = 10;
pub const DEFAULT_REVIEW_ITEM_COUNT: usize = 10;

// Catalog ---------------------------------------------------------------------
pub const FIRST_LEVEL_ID: u32 = 1;

// Logging targets ---------------------------------------------------------------
pub(crate) const LOG_TARGET_PROGRESSION: &str = "civics::progression";
pub(crate) const LOG_TARGET_SESSION: &str = "civics::session";
pub(crate) const LOG_TARGET_CONTENT: &str = "civics::content";
pub(crate) const LOG_TARGET_CONTROLLER: &str = "civics::controller";
