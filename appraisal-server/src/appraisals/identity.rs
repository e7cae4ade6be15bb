//! Actor identity resolution
//!
//! Maps a login account to its employee record and the employees it
//! oversees. Only direct links are followed, so a cycle in the reporting
//! data cannot make resolution loop.

use shared::{AccountId, EmployeeId};
use std::collections::HashSet;
use std::sync::Arc;

use super::error::AppraisalResult;
use crate::db::EmployeeDirectory;

/// Who is acting, and whom they directly oversee
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorContext {
    pub account_id: AccountId,
    /// Employee linked to the account, if any
    pub employee_id: Option<EmployeeId>,
    /// Employees whose supervisor is the actor's employee
    pub supervised: HashSet<EmployeeId>,
    /// Employees whose reviewer is the actor's employee
    pub reviewed: HashSet<EmployeeId>,
}

impl ActorContext {
    /// Context for an account with no employee record
    pub fn detached(account_id: AccountId) -> Self {
        Self {
            account_id,
            ..Default::default()
        }
    }

    /// The actor is the employee being appraised
    pub fn is_owner(&self, employee_id: EmployeeId) -> bool {
        self.employee_id == Some(employee_id)
    }

    /// The actor supervises or reviews `employee_id` at employee level
    pub fn oversees(&self, employee_id: EmployeeId) -> bool {
        self.supervised.contains(&employee_id) || self.reviewed.contains(&employee_id)
    }
}

#[derive(Clone)]
pub struct IdentityResolver {
    employees: Arc<dyn EmployeeDirectory>,
}

impl IdentityResolver {
    pub fn new(employees: Arc<dyn EmployeeDirectory>) -> Self {
        Self { employees }
    }

    pub async fn resolve_actor_context(
        &self,
        account_id: AccountId,
    ) -> AppraisalResult<ActorContext> {
        let Some(employee) = self.employees.find_by_account(account_id).await? else {
            tracing::debug!(account_id, "Account has no employee record");
            return Ok(ActorContext::detached(account_id));
        };

        let supervised = self.employees.find_supervised_by(employee.id).await?;
        let reviewed = self.employees.find_reviewed_by(employee.id).await?;
        tracing::debug!(
            account_id,
            employee_id = employee.id,
            supervised = supervised.len(),
            reviewed = reviewed.len(),
            "Resolved actor context"
        );

        Ok(ActorContext {
            account_id,
            employee_id: Some(employee.id),
            supervised: supervised.into_iter().collect(),
            reviewed: reviewed.into_iter().collect(),
        })
    }
}
