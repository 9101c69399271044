//! Internal helpers for input validation and normalization.
//!
//! These utilities centralize the text/date rules so every operation
//! enforces the same invariants. Only [`parse_occurred_at`] is re-exported,
//! since callers need it to turn wire dates into UTC instants.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trims `value` and collapses inner whitespace runs into a single space.
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes a required label (expense title, category name).
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Display form of a category name.
pub(crate) fn normalize_category_display(value: &str) -> ResultEngine<String> {
    let collapsed = collapse_whitespace(value);
    if collapsed.is_empty() {
        return Err(EngineError::InvalidName(
            "category name must not be empty".to_string(),
        ));
    }
    Ok(collapsed)
}

/// Comparison key of a category name: NFC, lowercased, whitespace collapsed.
///
/// Two names with the same key are considered the same category.
pub(crate) fn normalize_category_key(display: &str) -> String {
    collapse_whitespace(display)
        .nfc()
        .flat_map(char::to_lowercase)
        .collect()
}

/// Trims optional free text; empty and whitespace-only values become `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Applies an optional text patch: `None` keeps `existing`, `Some("")`
/// clears it.
pub(crate) fn apply_optional_text_patch(
    existing: Option<String>,
    patch: Option<&str>,
) -> Option<String> {
    match patch {
        None => existing,
        Some(value) => normalize_optional_text(Some(value)),
    }
}

/// Parses an occurrence date coming from the outside world into UTC.
///
/// Accepted forms:
/// - RFC 3339 (`2024-03-05T12:30:00+01:00`), converted to UTC
/// - naive date-time (`2024-03-05T12:30:00`, `2024-03-05T12:30`), read as UTC
/// - bare date (`2024-03-05`), midnight UTC
pub fn parse_occurred_at(raw: &str) -> ResultEngine<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidDate("empty date".to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    Err(EngineError::InvalidDate(format!("unrecognized date: {trimmed}")))
}
