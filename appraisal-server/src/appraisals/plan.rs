//! Performance plan provisioning
//!
//! Plans are created lazily on the first save of the year. The supervisor
//! side must resolve to a login account; the reviewer side is optional.

use shared::EmployeeId;
use shared::models::{PerformancePlan, PlanCreate, PlanStatus};
use shared::util::now_millis;
use std::sync::Arc;

use super::error::{AppraisalError, AppraisalResult, Entity};
use super::locks::{KeyedGuard, KeyedLocks};
use crate::db::{EmployeeDirectory, PlanStore};

#[derive(Clone)]
pub struct PlanProvisioner {
    employees: Arc<dyn EmployeeDirectory>,
    plans: Arc<dyn PlanStore>,
    locks: Arc<KeyedLocks<(EmployeeId, i32)>>,
}

/// An employee's plan for one year, stored or about to be
pub enum PlanSlot {
    Existing(PerformancePlan),
    Pending(PendingPlan),
}

/// A plan resolved but not yet written
///
/// Holds the (employee, year) lock until persisted or dropped, so no other
/// save can provision the same plan in between.
pub struct PendingPlan {
    create: PlanCreate,
    plans: Arc<dyn PlanStore>,
    _guard: KeyedGuard<(EmployeeId, i32)>,
}

impl PendingPlan {
    /// Unsaved view of the plan for checking a candidate against it
    pub fn preview(&self) -> PerformancePlan {
        PerformancePlan {
            id: 0,
            employee_id: self.create.employee_id,
            supervisor_account_id: self.create.supervisor_account_id,
            reviewer_account_id: self.create.reviewer_account_id,
            year: self.create.year,
            period_label: self.create.period_label.clone(),
            status: PlanStatus::Active,
            period_start: None,
            period_end: None,
            created_at: now_millis(),
        }
    }

    pub async fn persist(self) -> AppraisalResult<PerformancePlan> {
        let plan = self.plans.create(self.create).await?;
        tracing::info!(
            plan_id = plan.id,
            employee_id = plan.employee_id,
            year = plan.year,
            supervisor_account_id = plan.supervisor_account_id,
            "Performance plan provisioned"
        );
        Ok(plan)
    }
}

impl PlanProvisioner {
    pub fn new(employees: Arc<dyn EmployeeDirectory>, plans: Arc<dyn PlanStore>) -> Self {
        Self {
            employees,
            plans,
            locks: Arc::new(KeyedLocks::new()),
        }
    }

    /// Find the employee's plan for `year`, or work out the one to create
    ///
    /// Nothing is written here; a [`PlanSlot::Pending`] is stored by
    /// [`PendingPlan::persist`].
    pub async fn resolve(&self, employee_id: EmployeeId, year: i32) -> AppraisalResult<PlanSlot> {
        let guard = self.locks.lock(&(employee_id, year)).await;

        if let Some(plan) = self.plans.find_for_year(employee_id, year).await? {
            return Ok(PlanSlot::Existing(plan));
        }

        let employee = self
            .employees
            .find_by_id(employee_id)
            .await?
            .ok_or_else(|| AppraisalError::not_found(Entity::Employee, employee_id))?;

        let missing = || AppraisalError::MissingSupervisorAccount { employee_id };
        let supervisor_id = employee.supervisor_id.ok_or_else(missing)?;
        let supervisor_account_id = self
            .employees
            .find_by_id(supervisor_id)
            .await?
            .and_then(|s| s.account_id)
            .ok_or_else(missing)?;

        let reviewer_account_id = match employee.reviewer_id {
            None => None,
            Some(reviewer_id) => {
                let account = self
                    .employees
                    .find_by_id(reviewer_id)
                    .await?
                    .and_then(|r| r.account_id);
                if account.is_none() {
                    tracing::warn!(
                        employee_id,
                        reviewer_id,
                        "Reviewer has no login account, plan created without one"
                    );
                }
                account
            }
        };

        Ok(PlanSlot::Pending(PendingPlan {
            create: PlanCreate {
                employee_id,
                supervisor_account_id,
                reviewer_account_id,
                year,
                period_label: PerformancePlan::default_period_label(year),
            },
            plans: self.plans.clone(),
            _guard: guard,
        }))
    }

    /// Find the employee's plan for `year`, creating it if needed
    pub async fn ensure_plan(
        &self,
        employee_id: EmployeeId,
        year: i32,
    ) -> AppraisalResult<PerformancePlan> {
        match self.resolve(employee_id, year).await? {
            PlanSlot::Existing(plan) => Ok(plan),
            PlanSlot::Pending(pending) => pending.persist().await,
        }
    }
}
