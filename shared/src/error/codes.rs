//! Unified error codes for the appraisal platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Identity errors (employees, accounts)
//! - 4xxx: Performance plan errors
//! - 5xxx: Appraisal errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1002,
    /// Token is invalid
    TokenInvalid = 1003,
    /// Actor does not resolve to a known account
    ActorUnresolved = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Identity ====================
    /// Employee not found
    EmployeeNotFound = 3001,

    // ==================== 4xxx: Plan ====================
    /// Performance plan not found
    PlanNotFound = 4001,
    /// Plan cannot be provisioned without a supervisor account
    MissingSupervisorAccount = 4002,
    /// Plan belongs to a different employee
    PlanEmployeeMismatch = 4003,

    // ==================== 5xxx: Appraisal ====================
    /// Appraisal not found
    AppraisalNotFound = 5001,
    /// Appraisal content incomplete for submission
    AppraisalIncomplete = 5002,
    /// Status transition is not a legal edge
    InvalidTransition = 5003,
    /// A submitted appraisal already exists for the employee/plan/type
    DuplicateSubmission = 5004,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::ActorUnresolved => "Actor does not resolve to a valid identity",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Identity
            ErrorCode::EmployeeNotFound => "Employee not found",

            // Plan
            ErrorCode::PlanNotFound => "Performance plan not found",
            ErrorCode::MissingSupervisorAccount => {
                "Employee's supervisor has no login account to approve the plan"
            }
            ErrorCode::PlanEmployeeMismatch => "Performance plan belongs to another employee",

            // Appraisal
            ErrorCode::AppraisalNotFound => "Appraisal not found",
            ErrorCode::AppraisalIncomplete => "Appraisal is incomplete and cannot be submitted",
            ErrorCode::InvalidTransition => "Appraisal status transition is not allowed",
            ErrorCode::DuplicateSubmission => {
                "An appraisal has already been submitted for this employee and period"
            }

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::TokenExpired),
            1003 => Ok(ErrorCode::TokenInvalid),
            1004 => Ok(ErrorCode::ActorUnresolved),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Identity
            3001 => Ok(ErrorCode::EmployeeNotFound),

            // Plan
            4001 => Ok(ErrorCode::PlanNotFound),
            4002 => Ok(ErrorCode::MissingSupervisorAccount),
            4003 => Ok(ErrorCode::PlanEmployeeMismatch),

            // Appraisal
            5001 => Ok(ErrorCode::AppraisalNotFound),
            5002 => Ok(ErrorCode::AppraisalIncomplete),
            5003 => Ok(ErrorCode::InvalidTransition),
            5004 => Ok(ErrorCode::DuplicateSubmission),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::MissingSupervisorAccount.code(), 4002);
        assert_eq!(ErrorCode::DuplicateSubmission.code(), 5004);
    }

    #[test]
    fn test_try_from_roundtrip_for_appraisal_codes() {
        for code in [
            ErrorCode::AppraisalNotFound,
            ErrorCode::AppraisalIncomplete,
            ErrorCode::InvalidTransition,
            ErrorCode::DuplicateSubmission,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_unknown_value() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::InvalidTransition).unwrap();
        assert_eq!(json, "5003");
        let code: ErrorCode = serde_json::from_str("4002").unwrap();
        assert_eq!(code, ErrorCode::MissingSupervisorAccount);
    }
}
