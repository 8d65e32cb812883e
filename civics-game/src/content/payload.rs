//! Parsing and shape checks for provider payloads.
//!
//! The controller runs the `validate_*` checks on every delivered payload.
//! The `parse_*` entry points are for provider implementations that receive
//! raw JSON. Generators answer with JSON arrays: `[{question, options, correctAnswer}]`
//! for quizzes and `[{content, category}]` for review items.
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use super::{ContentFetchError, ContentKind, LevelContent, Question, ReviewItem};
use crate::constants::LOG_TARGET_CONTENT;

const MIN_OPTIONS: usize = 2;

fn parse_json<T: DeserializeOwned>(kind: ContentKind, json: &str) -> Result<T, ContentFetchError> {
    serde_json::from_str(json).map_err(|err| match err.classify() {
        Category::Data => ContentFetchError::schema(kind, err.to_string()),
        Category::Io | Category::Syntax | Category::Eof => ContentFetchError::Malformed {
            kind,
            reason: err.to_string(),
        },
    })
}

/// Check a question list has the expected length and answerable entries.
///
/// Membership of the correct answer and option uniqueness are left alone;
/// sessions tolerate both.
///
/// # Errors
///
/// [`ContentFetchError::Schema`] describing the first problem found.
pub fn validate_questions(
    kind: ContentKind,
    questions: &[Question],
    expected: usize,
) -> Result<(), ContentFetchError> {
    if questions.len() != expected {
        return Err(ContentFetchError::schema(
            kind,
            format!("expected {expected} questions, got {}", questions.len()),
        ));
    }
    for (index, question) in questions.iter().enumerate() {
        if question.question.trim().is_empty() {
            return Err(ContentFetchError::schema(
                kind,
                format!("question {} has no prompt", index + 1),
            ));
        }
        if question.options.len() < MIN_OPTIONS {
            return Err(ContentFetchError::schema(
                kind,
                format!(
                    "question {} has {} options, need at least {MIN_OPTIONS}",
                    index + 1,
                    question.options.len()
                ),
            ));
        }
        if !question.has_option(&question.correct_answer) {
            log::warn!(
                target: LOG_TARGET_CONTENT,
                "{kind} question {} lists an answer that is not among its options",
                index + 1
            );
        }
    }
    Ok(())
}

/// # Errors
///
/// [`ContentFetchError::Schema`] for an empty list.
pub fn validate_review_items(items: &[ReviewItem]) -> Result<(), ContentFetchError> {
    if items.is_empty() {
        return Err(ContentFetchError::schema(
            ContentKind::Review,
            "no review items returned",
        ));
    }
    if let Some(index) = items.iter().position(|item| item.content.trim().is_empty()) {
        return Err(ContentFetchError::schema(
            ContentKind::Review,
            format!("review item {} is blank", index + 1),
        ));
    }
    Ok(())
}

/// Parse a quiz payload of exactly `expected` questions.
///
/// # Errors
///
/// [`ContentFetchError::Malformed`] for invalid JSON, [`ContentFetchError::Schema`]
/// for valid JSON of the wrong shape.
pub fn parse_questions(
    kind: ContentKind,
    json: &str,
    expected: usize,
) -> Result<Vec<Question>, ContentFetchError> {
    let questions: Vec<Question> = parse_json(kind, json)?;
    validate_questions(kind, &questions, expected)?;
    Ok(questions)
}

/// Combine generated lesson text with the level quiz payload.
///
/// # Errors
///
/// Fails when the lesson is empty or the quiz payload does not parse.
pub fn parse_level_content(
    lesson: &str,
    quiz_json: &str,
    expected_questions: usize,
) -> Result<LevelContent, ContentFetchError> {
    if lesson.trim().is_empty() {
        return Err(ContentFetchError::schema(
            ContentKind::Level,
            "lesson text is empty",
        ));
    }
    let questions = parse_questions(ContentKind::Level, quiz_json, expected_questions)?;
    Ok(LevelContent {
        content: lesson.to_string(),
        questions,
    })
}

/// # Errors
///
/// [`ContentFetchError::Malformed`] for invalid JSON, [`ContentFetchError::Schema`]
/// for unknown categories or blank items.
pub fn parse_review_items(json: &str) -> Result<Vec<ReviewItem>, ContentFetchError> {
    let items: Vec<ReviewItem> = parse_json(ContentKind::Review, json)?;
    validate_review_items(&items)?;
    Ok(items)
}
