//! Field validation shared by payload types.

use thiserror::Error;

/// Maximum length of titles (tasks, projects, ideas, concept notes).
pub const MAX_TITLE_LEN: usize = 100;

/// Maximum length of a tag name or an activity type.
pub const MAX_LABEL_LEN: usize = 50;

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Largest page size any list endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A payload field failed validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Offending field name.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    /// Build an error for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Result alias for validation checks.
pub type ValidationResult = Result<(), ValidationError>;

/// Check that `value` is non-blank and at most `max` characters.
pub fn text(field: &'static str, value: &str, max: usize) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Check a title field.
pub fn title(value: &str) -> ValidationResult {
    text("title", value, MAX_TITLE_LEN)
}

/// Check an optional title field of a partial update.
pub fn title_opt(value: Option<&str>) -> ValidationResult {
    value.map_or(Ok(()), title)
}

/// Usernames: 3 to 50 characters of ASCII letters, digits, `_`, `.`, `-`.
pub fn username(value: &str) -> ValidationResult {
    let len = value.chars().count();
    if !(3..=50).contains(&len) {
        return Err(ValidationError::new(
            "username",
            "must be between 3 and 50 characters",
        ));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(ValidationError::new(
            "username",
            "may only contain letters, digits, '_', '.' and '-'",
        ));
    }
    Ok(())
}

/// Structural email check: one `@`, non-empty local part, dotted domain.
pub fn email(value: &str) -> ValidationResult {
    let invalid = || ValidationError::new("email", "is not a valid email address");
    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

/// Passwords need at least [`MIN_PASSWORD_LEN`] characters.
pub fn password(value: &str) -> ValidationResult {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

/// Check a page size against `1..=MAX_PAGE_SIZE`.
pub fn limit(value: u32) -> ValidationResult {
    if value == 0 || value > MAX_PAGE_SIZE {
        return Err(ValidationError::new(
            "limit",
            format!("must be between 1 and {MAX_PAGE_SIZE}"),
        ));
    }
    Ok(())
}

/// A JSON payload column that must hold an object.
pub fn json_object(field: &'static str, value: &serde_json::Value) -> ValidationResult {
    if value.is_object() {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be a JSON object"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
