//! Small composable validation checks.
//!
//! Each check returns a [`Validation`]. Types describe their rules as a
//! slice of check functions and run them with [`validate_all`], which stops
//! at the first failure.

/// A failed check on a named field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of a single check.
pub type Validation = std::result::Result<(), ValidationError>;

/// A rule over `T`.
pub type Check<T> = fn(&T) -> Validation;

/// Run `checks` against `value` in order, returning the first failure.
pub fn validate_all<T>(value: &T, checks: &[Check<T>]) -> Validation {
    checks.iter().try_for_each(|check| check(value))
}

pub fn require_non_empty(field: &str, value: &str) -> Validation {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

pub fn require_equals(field: &str, actual: &str, expected: &str) -> Validation {
    if actual != expected {
        return Err(ValidationError::new(
            field,
            format!("expected '{expected}', found '{actual}'"),
        ));
    }
    Ok(())
}

/// Every element must be a non-empty string.
pub fn require_each_non_empty(field: &str, values: &[String]) -> Validation {
    match values.iter().position(|v| v.trim().is_empty()) {
        Some(index) => Err(ValidationError::new(
            format!("{field}[{index}]"),
            "must not be empty",
        )),
        None => Ok(()),
    }
}

/// `value` must be present when `required` holds.
pub fn require_present<V>(field: &str, value: Option<&V>, required: bool) -> Validation {
    if required && value.is_none() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(())
}
