//! Sanitization and validation applied to every task before it reaches storage.
//!
//! Sanitizers are total and idempotent; validators fail fast on the first
//! bad field with [`CoreError::InvalidArgument`].

use crate::error::CoreError;
use crate::task::{Task, TaskPriority, TaskStatus};
use chrono::{DateTime, NaiveDate, Utc};

pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 100;
/// Ceiling applied while sanitizing, before the business limit is checked.
pub const DESCRIPTION_SANITIZE_CHARS: usize = 500;
pub const CATEGORY_MAX_CHARS: usize = 50;

/// Strip markup and control characters, collapse whitespace runs, trim.
///
/// A `<...>` span is replaced by a space; an angle bracket with no partner
/// is dropped.
pub fn sanitize_text(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        let width = c.len_utf8();
        match c {
            '<' => match rest[width..].find('>') {
                Some(close) => {
                    stripped.push(' ');
                    rest = &rest[width + close + 1..];
                    continue;
                }
                None => {}
            },
            '>' => {}
            c if c.is_whitespace() => stripped.push(' '),
            c if c.is_control() => {}
            c => stripped.push(c),
        }
        rest = &rest[width..];
    }
    collapse_whitespace(&stripped)
}

pub fn sanitize_description(input: &str) -> String {
    truncate_chars(&sanitize_text(input), DESCRIPTION_SANITIZE_CHARS)
}

/// Reduce a category to `[A-Za-z0-9 -]`, at most 50 characters.
pub fn sanitize_category(input: &str) -> String {
    let allowed: String = sanitize_text(input)
        .chars()
        .filter(|c| is_category_char(*c))
        .collect();
    truncate_chars(&collapse_whitespace(&allowed), CATEGORY_MAX_CHARS)
}

/// Sanitize and check a description, returning the sanitized form.
pub fn validate_description(text: &str) -> Result<String, CoreError> {
    let sanitized = sanitize_description(text);
    if sanitized.is_empty() {
        return Err(CoreError::invalid("description", "description cannot be blank"));
    }
    let len = sanitized.chars().count();
    if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&len) {
        return Err(CoreError::invalid(
            "description",
            format!(
                "description must be {}-{} characters, got {}",
                DESCRIPTION_MIN_CHARS, DESCRIPTION_MAX_CHARS, len
            ),
        ));
    }
    Ok(sanitized)
}

/// Parse an externally supplied status name.
pub fn validate_status(value: &str) -> Result<TaskStatus, CoreError> {
    value.parse()
}

/// Parse an externally supplied priority name.
pub fn validate_priority(value: &str) -> Result<TaskPriority, CoreError> {
    value.parse()
}

/// Sanitize and check a category, returning the sanitized form.
pub fn validate_category(text: &str) -> Result<String, CoreError> {
    let sanitized = sanitize_category(text);
    if sanitized.is_empty() {
        return Err(CoreError::invalid(
            "category",
            format!("category '{}' is empty after sanitization", text),
        ));
    }
    if sanitized.chars().count() > CATEGORY_MAX_CHARS {
        return Err(CoreError::invalid(
            "category",
            format!("category cannot exceed {} characters", CATEGORY_MAX_CHARS),
        ));
    }
    if !sanitized.chars().all(is_category_char) {
        return Err(CoreError::invalid(
            "category",
            "category may only contain letters, digits, spaces and hyphens",
        ));
    }
    Ok(sanitized)
}

/// Reject a due date whose calendar day is before `today`. Time of day is ignored.
pub fn validate_due_date(
    due_date: Option<DateTime<Utc>>,
    today: NaiveDate,
) -> Result<(), CoreError> {
    match due_date {
        Some(due) if due.date_naive() < today => Err(CoreError::invalid(
            "due date",
            format!("due date {} is in the past", due.date_naive()),
        )),
        _ => Ok(()),
    }
}

/// Validate a task and rewrite it into its sanitized form.
///
/// On success the description and categories are replaced by their
/// sanitized values (duplicates produced by sanitization collapse into one)
/// and `last_modified_date` is stamped.
pub fn validate_task(task: &mut Task) -> Result<(), CoreError> {
    validate_task_at(task, Utc::now())
}

/// [`validate_task`] against an explicit clock.
pub fn validate_task_at(task: &mut Task, now: DateTime<Utc>) -> Result<(), CoreError> {
    let description = validate_description(&task.description)?;

    // Status and priority are closed enums; deserialization already rejected
    // anything outside them.
    match task.status {
        TaskStatus::Pending
        | TaskStatus::InProgress
        | TaskStatus::Completed
        | TaskStatus::Cancelled => {}
    }
    match task.priority {
        TaskPriority::High | TaskPriority::Medium | TaskPriority::Low => {}
    }

    let mut categories: Vec<String> = Vec::with_capacity(task.categories.len());
    for raw in &task.categories {
        let category = validate_category(raw)?;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    validate_due_date(task.due_date, now.date_naive())?;

    task.description = description;
    task.categories = categories;
    task.touch(now);
    Ok(())
}

fn is_category_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '-'
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => s[..cut].trim_end().to_string(),
        None => s.to_string(),
    }
}
