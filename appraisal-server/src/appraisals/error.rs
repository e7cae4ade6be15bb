//! Appraisal engine errors
//!
//! Every variant is recoverable and maps to its own caller-visible
//! [`ErrorCode`]; nothing here aborts the process.

use serde::Serialize;
use shared::models::AppraisalStatus;
use shared::{AccountId, AppError, EmployeeId, ErrorCode};
use std::fmt;
use thiserror::Error;

use crate::db::repository::RepoError;

/// Entity kinds that can be reported missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Employee,
    Plan,
    Appraisal,
}

impl Entity {
    fn error_code(&self) -> ErrorCode {
        match self {
            Entity::Employee => ErrorCode::EmployeeNotFound,
            Entity::Plan => ErrorCode::PlanNotFound,
            Entity::Appraisal => ErrorCode::AppraisalNotFound,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Employee => "Employee",
            Entity::Plan => "Performance plan",
            Entity::Appraisal => "Appraisal",
        })
    }
}

/// One failing field in a validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn field_names(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum AppraisalError {
    #[error("{entity} {key} not found")]
    NotFound { entity: Entity, key: String },

    #[error("Account {0} does not resolve to a valid identity")]
    Unauthorized(AccountId),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Request fields out of range or malformed
    #[error("Invalid input: {}", field_names(.0))]
    InvalidInput(Vec<FieldError>),

    /// Appraisal content incomplete for submission
    #[error("Validation failed: {}", field_names(.0))]
    Validation(Vec<FieldError>),

    #[error("Plan {plan_id} does not belong to employee {employee_id}")]
    PlanMismatch { plan_id: i64, employee_id: EmployeeId },

    #[error("Cannot move appraisal from {from} to {to}")]
    InvalidTransition {
        from: AppraisalStatus,
        to: AppraisalStatus,
    },

    #[error("Appraisal {existing_id} has already been submitted for this employee and period")]
    DuplicateSubmission { existing_id: i64 },

    #[error("Employee {employee_id} has no supervisor with a login account")]
    MissingSupervisorAccount { employee_id: EmployeeId },

    #[error(transparent)]
    Repository(#[from] RepoError),
}

impl AppraisalError {
    pub fn not_found(entity: Entity, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput(vec![FieldError::new(field, message)])
    }
}

pub type AppraisalResult<T> = Result<T, AppraisalError>;

impl From<AppraisalError> for AppError {
    fn from(err: AppraisalError) -> Self {
        let message = err.to_string();
        match err {
            AppraisalError::NotFound { entity, key } => {
                AppError::with_message(entity.error_code(), message).with_detail("id", key)
            }
            AppraisalError::Unauthorized(_) => {
                AppError::with_message(ErrorCode::ActorUnresolved, message)
            }
            AppraisalError::Forbidden(_) => {
                AppError::with_message(ErrorCode::PermissionDenied, message)
            }
            AppraisalError::InvalidInput(fields) => {
                let fields = serde_json::to_value(&fields).unwrap_or_default();
                AppError::with_message(ErrorCode::ValidationFailed, message)
                    .with_detail("fields", fields)
            }
            AppraisalError::Validation(fields) => {
                let fields = serde_json::to_value(&fields).unwrap_or_default();
                AppError::with_message(ErrorCode::AppraisalIncomplete, message)
                    .with_detail("fields", fields)
            }
            AppraisalError::PlanMismatch {
                plan_id,
                employee_id,
            } => AppError::with_message(ErrorCode::PlanEmployeeMismatch, message)
                .with_detail("plan_id", plan_id)
                .with_detail("employee_id", employee_id),
            AppraisalError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            AppraisalError::DuplicateSubmission { existing_id } => {
                AppError::with_message(ErrorCode::DuplicateSubmission, message)
                    .with_detail("existing_id", existing_id)
            }
            AppraisalError::MissingSupervisorAccount { employee_id } => {
                AppError::with_message(ErrorCode::MissingSupervisorAccount, message)
                    .with_detail("employee_id", employee_id)
            }
            AppraisalError::Repository(e) => AppError::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_validation_lists_every_field() {
        let err = AppraisalError::Validation(vec![
            FieldError::new("overall_rating", "required"),
            FieldError::new("self_assessment.ratings", "required"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: overall_rating, self_assessment.ratings"
        );

        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::AppraisalIncomplete);
        let details = app.details.unwrap();
        let fields = &details["fields"];
        assert_eq!(fields.as_array().unwrap().len(), 2);
        assert_eq!(fields[0]["field"], "overall_rating");
    }

    #[test]
    fn test_duplicate_submission_carries_existing_id() {
        let app: AppError = AppraisalError::DuplicateSubmission { existing_id: 77 }.into();
        assert_eq!(app.code, ErrorCode::DuplicateSubmission);
        assert_eq!(app.http_status(), StatusCode::CONFLICT);
        assert_eq!(app.details.unwrap()["existing_id"], 77);
    }

    #[test]
    fn test_not_found_uses_entity_code() {
        let app: AppError = AppraisalError::not_found(Entity::Plan, 9).into();
        assert_eq!(app.code, ErrorCode::PlanNotFound);
        assert_eq!(app.message, "Performance plan 9 not found");
    }

    #[test]
    fn test_each_variant_has_distinct_code() {
        let codes: Vec<ErrorCode> = vec![
            AppraisalError::not_found(Entity::Appraisal, 1),
            AppraisalError::Unauthorized(1),
            AppraisalError::Forbidden("x".into()),
            AppraisalError::invalid_field("f", "m"),
            AppraisalError::InvalidTransition {
                from: AppraisalStatus::Approved,
                to: AppraisalStatus::Draft,
            },
            AppraisalError::DuplicateSubmission { existing_id: 1 },
            AppraisalError::MissingSupervisorAccount { employee_id: 1 },
            AppraisalError::Validation(vec![FieldError::new("overall_rating", "m")]),
            AppraisalError::PlanMismatch {
                plan_id: 1,
                employee_id: 2,
            },
        ]
        .into_iter()
        .map(|e| AppError::from(e).code)
        .collect();

        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
