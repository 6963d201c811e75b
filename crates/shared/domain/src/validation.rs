//! Structural field validation.
//!
//! Records and inputs derive [`validator::Validate`]; the helpers here run the
//! derived rules at a boundary and flatten the result into a list of
//! violations instead of a first-error-wins message.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::constants::USERNAME_PATTERN;
use crate::error::DomainError;

/// Letters, digits and underscore only.
pub static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(USERNAME_PATTERN).expect("username pattern is a valid regex"));

/// A single failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Run the derived rules of `value`, returning every violation.
///
/// Empty when the value is valid. Sorted by field, then message.
pub fn check<T: Validate>(value: &T) -> Vec<FieldViolation> {
    match value.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => violations(&errors),
    }
}

/// Run the derived rules of `value`, joining all violations into one error.
pub fn ensure_valid<T: Validate>(value: &T) -> Result<(), DomainError> {
    let violations = check(value);
    if violations.is_empty() {
        return Ok(());
    }

    let message = violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Err(DomainError::validation(message))
}

fn violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut list: Vec<FieldViolation> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldViolation {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field)),
            })
        })
        .collect();

    list.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    list
}
