//! Common types for the shared crate
//!
//! Utility types used across the platform

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Employee record identifier
pub type EmployeeId = i64;

/// Login account identifier
pub type AccountId = i64;

/// Appraisal-related capabilities a role can hold
///
/// Closed set: adding a capability is a compile-time visible change for
/// every exhaustive match over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// See every appraisal regardless of reporting lines
    ViewAllAppraisals,
    /// Advance appraisals through supervisor review
    ReviewAppraisals,
    /// Give final approval
    ApproveAppraisals,
    /// Reject an appraisal under review
    RejectAppraisals,
}

impl Permission {
    /// All permissions, in declaration order
    pub const ALL: [Permission; 4] = [
        Permission::ViewAllAppraisals,
        Permission::ReviewAppraisals,
        Permission::ApproveAppraisals,
        Permission::RejectAppraisals,
    ];

    /// Stable `resource:action` name
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewAllAppraisals => "appraisals:view_all",
            Permission::ReviewAppraisals => "appraisals:review",
            Permission::ApproveAppraisals => "appraisals:approve",
            Permission::RejectAppraisals => "appraisals:reject",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
