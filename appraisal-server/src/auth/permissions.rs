//! Permission Definitions
//!
//! Role → permission table for the appraisal workflow.
//!
//! - Ordinary staff need no permission to work on their own appraisal
//! - Review/approve/reject gates the status a supervisor or reviewer may set
//! - Roles holding `ViewAllAppraisals` are HR-privileged and see every record

use shared::Permission;
use shared::models::{AppraisalStatus, Role};
use std::collections::{HashMap, HashSet};

/// Team leads review
pub const DEFAULT_TEAM_LEAD_PERMISSIONS: &[Permission] = &[Permission::ReviewAppraisals];

/// Managers review, approve and reject
pub const DEFAULT_MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::ReviewAppraisals,
    Permission::ApproveAppraisals,
    Permission::RejectAppraisals,
];

/// HR officers see everything and review
pub const DEFAULT_HR_OFFICER_PERMISSIONS: &[Permission] =
    &[Permission::ViewAllAppraisals, Permission::ReviewAppraisals];

/// Get default permissions for a role
pub fn default_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Staff => &[],
        Role::TeamLead => DEFAULT_TEAM_LEAD_PERMISSIONS,
        Role::Manager => DEFAULT_MANAGER_PERMISSIONS,
        Role::HrOfficer => DEFAULT_HR_OFFICER_PERMISSIONS,
        Role::HrManager | Role::Admin => &Permission::ALL,
    }
}

/// Immutable role → permissions table, built once at startup
#[derive(Debug, Clone)]
pub struct RoleTable {
    grants: HashMap<Role, HashSet<Permission>>,
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::defaults()
    }
}

impl RoleTable {
    pub fn defaults() -> Self {
        let grants = Role::ALL
            .iter()
            .map(|role| (*role, default_permissions(*role).iter().copied().collect()))
            .collect();
        Self { grants }
    }

    /// Defaults, with `ViewAllAppraisals` granted to exactly `hr_roles`
    pub fn with_hr_roles(hr_roles: &[Role]) -> Self {
        let mut table = Self::defaults();
        for (role, perms) in table.grants.iter_mut() {
            if hr_roles.contains(role) {
                perms.insert(Permission::ViewAllAppraisals);
            } else {
                perms.remove(&Permission::ViewAllAppraisals);
            }
        }
        table
    }

    pub fn has(&self, role: Role, permission: Permission) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|perms| perms.contains(&permission))
    }

    /// Sees every appraisal regardless of reporting lines
    pub fn is_hr_privileged(&self, role: Role) -> bool {
        self.has(role, Permission::ViewAllAppraisals)
    }

    pub fn permissions(&self, role: Role) -> Vec<Permission> {
        let mut perms: Vec<Permission> = self
            .grants
            .get(&role)
            .map(|p| p.iter().copied().collect())
            .unwrap_or_default();
        perms.sort_by_key(|p| p.as_str());
        perms
    }
}

/// Permission a non-owner needs to move an appraisal into `status`
///
/// `draft` and `submitted` are owner states and need none.
pub fn required_permission(status: AppraisalStatus) -> Option<Permission> {
    match status {
        AppraisalStatus::Draft | AppraisalStatus::Submitted => None,
        AppraisalStatus::SupervisorReview
        | AppraisalStatus::ReviewerAssessment
        | AppraisalStatus::RevisionRequested => Some(Permission::ReviewAppraisals),
        AppraisalStatus::Approved => Some(Permission::ApproveAppraisals),
        AppraisalStatus::Rejected => Some(Permission::RejectAppraisals),
    }
}
