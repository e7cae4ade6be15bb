//! Employee and Account Models
//!
//! An [`Employee`] is a person record carrying reporting lines; an
//! [`Account`] is a login identity. The two are linked by
//! `Employee::account_id`, and either may exist without the other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{AccountId, EmployeeId};

/// Employee entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    /// Login account, if this person can sign in
    pub account_id: Option<AccountId>,
    /// Direct supervisor (employee-level link)
    pub supervisor_id: Option<EmployeeId>,
    /// Reviewer (employee-level link)
    pub reviewer_id: Option<EmployeeId>,
    pub department: Option<String>,
    pub position: Option<String>,
}

/// Account role
///
/// Ordinary staff roles, HR roles and the administrator. Which of these see
/// every appraisal is decided by the role table, not by the enum itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Staff,
    TeamLead,
    Manager,
    HrOfficer,
    HrManager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Staff,
        Role::TeamLead,
        Role::Manager,
        Role::HrOfficer,
        Role::HrManager,
        Role::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::TeamLead => "team_lead",
            Role::Manager => "manager",
            Role::HrOfficer => "hr_officer",
            Role::HrManager => "hr_manager",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Account entity (login identity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("hr_manager".parse::<Role>(), Ok(Role::HrManager));
        assert_eq!(" Staff ".parse::<Role>(), Ok(Role::Staff));
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_display_matches_serde() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role));
        }
    }
}
