//! Appraisal visibility
//!
//! Builds the predicate restricting which appraisals an actor may see. HR
//! roles (per the injected [`RoleTable`]) see everything; everyone else sees
//! records where they are the approving account on either side, or where the
//! employee reports to them directly. An employee filter only ever narrows.

use shared::models::{Appraisal, Role};
use shared::{AccountId, EmployeeId};
use std::collections::HashSet;
use std::sync::Arc;

use super::identity::ActorContext;
use crate::auth::RoleTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// No relationship required
    All,
    /// Any of the four relationships to the actor
    Related {
        account_id: AccountId,
        supervised: HashSet<EmployeeId>,
        reviewed: HashSet<EmployeeId>,
    },
}

/// Which appraisals are visible, evaluable in memory or by a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityPredicate {
    pub employee_filter: Option<EmployeeId>,
    pub scope: Scope,
}

impl VisibilityPredicate {
    pub fn matches(&self, appraisal: &Appraisal) -> bool {
        if self
            .employee_filter
            .is_some_and(|id| id != appraisal.employee_id)
        {
            return false;
        }
        match &self.scope {
            Scope::All => true,
            Scope::Related {
                account_id,
                supervised,
                reviewed,
            } => {
                appraisal.supervisor_account_id == Some(*account_id)
                    || appraisal.reviewer_account_id == Some(*account_id)
                    || supervised.contains(&appraisal.employee_id)
                    || reviewed.contains(&appraisal.employee_id)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisibilityFilter {
    roles: Arc<RoleTable>,
}

impl VisibilityFilter {
    pub fn new(roles: Arc<RoleTable>) -> Self {
        Self { roles }
    }

    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    pub fn is_privileged(&self, role: Role) -> bool {
        self.roles.is_hr_privileged(role)
    }

    pub fn build_predicate(
        &self,
        actor: &ActorContext,
        role: Role,
        employee_filter: Option<EmployeeId>,
    ) -> VisibilityPredicate {
        let scope = if self.is_privileged(role) {
            Scope::All
        } else {
            Scope::Related {
                account_id: actor.account_id,
                supervised: actor.supervised.clone(),
                reviewed: actor.reviewed.clone(),
            }
        };
        VisibilityPredicate {
            employee_filter,
            scope,
        }
    }
}
