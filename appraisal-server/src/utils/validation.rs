//! Input validation helpers
//!
//! Centralized text length constants and validation functions. Helpers
//! return the failing field so callers can report every problem at once.

use shared::models::AppraisalComments;

use crate::appraisals::FieldError;

// ── Text length limits ──────────────────────────────────────────────

/// Appraisal type labels ("annual", "probation", ...)
pub const MAX_APPRAISAL_TYPE_LEN: usize = 64;

/// Free-text comments and recommendations
pub const MAX_COMMENT_LEN: usize = 4000;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Option<FieldError> {
    if value.trim().is_empty() {
        return Some(FieldError::new(field, format!("{field} must not be empty")));
    }
    validate_length(value, field, max_len)
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Option<FieldError> {
    value
        .as_deref()
        .and_then(|v| validate_length(v, field, max_len))
}

fn validate_length(value: &str, field: &str, max_len: usize) -> Option<FieldError> {
    let len = value.chars().count();
    (len > max_len).then(|| {
        FieldError::new(
            field,
            format!("{field} is too long ({len} chars, max {max_len})"),
        )
    })
}

/// Length checks for every comment field
pub fn validate_comments(comments: &AppraisalComments) -> Vec<FieldError> {
    [
        ("comments.employee_comments", &comments.employee_comments),
        ("comments.supervisor_comments", &comments.supervisor_comments),
        ("comments.reviewer_comments", &comments.reviewer_comments),
        ("comments.recommendations", &comments.recommendations),
    ]
    .into_iter()
    .filter_map(|(field, value)| validate_optional_text(value, field, MAX_COMMENT_LEN))
    .collect()
}
