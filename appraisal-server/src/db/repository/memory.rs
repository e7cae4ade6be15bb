//! In-process store
//!
//! Directory data (employees, accounts) lives in `DashMap`s since it is
//! read-mostly. Plans and appraisals sit behind a single `RwLock` each so the
//! uniqueness checks in `create` run under the same write guard as the insert.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Deserialize;
use shared::models::{Account, Appraisal, AppraisalStatus, Employee, PerformancePlan, PlanCreate};
use shared::{AccountId, EmployeeId};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use super::{
    AccountDirectory, AppraisalStore, EmployeeDirectory, PlanStore, RepoError, RepoResult,
};
use crate::appraisals::{DraftKey, VisibilityPredicate};

/// Directory seed file contents
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Debug)]
pub struct MemoryStore {
    employees: DashMap<EmployeeId, Employee>,
    accounts: DashMap<AccountId, Account>,
    plans: RwLock<BTreeMap<i64, PerformancePlan>>,
    appraisals: RwLock<BTreeMap<i64, Appraisal>>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            employees: DashMap::new(),
            accounts: DashMap::new(),
            plans: RwLock::new(BTreeMap::new()),
            appraisals: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn insert_employee(&self, employee: Employee) {
        self.employees.insert(employee.id, employee);
    }

    pub fn insert_account(&self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    /// Seed the directory; returns the number of records loaded
    pub fn load(&self, fixture: Fixture) -> usize {
        let count = fixture.employees.len() + fixture.accounts.len();
        for employee in fixture.employees {
            self.insert_employee(employee);
        }
        for account in fixture.accounts {
            self.insert_account(account);
        }
        count
    }

    /// Seed the directory from a JSON file
    pub fn load_fixture(&self, path: &Path) -> RepoResult<usize> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RepoError::Database(format!("Failed to read {}: {e}", path.display())))?;
        let fixture: Fixture = serde_json::from_str(&raw)
            .map_err(|e| RepoError::Validation(format!("Invalid seed file: {e}")))?;
        Ok(self.load(fixture))
    }

    pub fn appraisal_count(&self) -> usize {
        self.appraisals.read().len()
    }

    pub fn plan_count(&self) -> usize {
        self.plans.read().len()
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        Ok(self.employees.get(&id).map(|e| e.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Employee>> {
        let email = email.trim();
        Ok(self
            .employees
            .iter()
            .find(|e| e.email.eq_ignore_ascii_case(email))
            .map(|e| e.value().clone()))
    }

    async fn find_by_account(&self, account_id: AccountId) -> RepoResult<Option<Employee>> {
        Ok(self
            .employees
            .iter()
            .find(|e| e.account_id == Some(account_id))
            .map(|e| e.value().clone()))
    }

    async fn find_supervised_by(&self, supervisor: EmployeeId) -> RepoResult<Vec<EmployeeId>> {
        Ok(self
            .employees
            .iter()
            .filter(|e| e.supervisor_id == Some(supervisor))
            .map(|e| e.id)
            .collect())
    }

    async fn find_reviewed_by(&self, reviewer: EmployeeId) -> RepoResult<Vec<EmployeeId>> {
        Ok(self
            .employees
            .iter()
            .filter(|e| e.reviewer_id == Some(reviewer))
            .map(|e| e.id)
            .collect())
    }
}

#[async_trait]
impl AccountDirectory for MemoryStore {
    async fn find_by_id(&self, id: AccountId) -> RepoResult<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.value().clone()))
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<PerformancePlan>> {
        Ok(self.plans.read().get(&id).cloned())
    }

    async fn find_for_year(
        &self,
        employee_id: EmployeeId,
        year: i32,
    ) -> RepoResult<Option<PerformancePlan>> {
        Ok(self
            .plans
            .read()
            .values()
            .find(|p| p.employee_id == employee_id && p.year == year)
            .cloned())
    }

    async fn create(&self, data: PlanCreate) -> RepoResult<PerformancePlan> {
        let mut plans = self.plans.write();
        if plans
            .values()
            .any(|p| p.employee_id == data.employee_id && p.year == data.year)
        {
            return Err(RepoError::Duplicate(format!(
                "Plan for employee {} in {} already exists",
                data.employee_id, data.year
            )));
        }

        let plan = PerformancePlan {
            id: self.next_id(),
            employee_id: data.employee_id,
            supervisor_account_id: data.supervisor_account_id,
            reviewer_account_id: data.reviewer_account_id,
            year: data.year,
            period_label: data.period_label,
            status: Default::default(),
            period_start: None,
            period_end: None,
            created_at: shared::util::now_millis(),
        };
        plans.insert(plan.id, plan.clone());
        Ok(plan)
    }
}

fn conflicting_draft<'a>(
    appraisals: &'a BTreeMap<i64, Appraisal>,
    candidate: &Appraisal,
) -> Option<&'a Appraisal> {
    if candidate.status != AppraisalStatus::Draft {
        return None;
    }
    let key = DraftKey::of(candidate);
    appraisals
        .values()
        .find(|a| a.id != candidate.id && a.status == AppraisalStatus::Draft && key.matches(a))
}

#[async_trait]
impl AppraisalStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Appraisal>> {
        Ok(self.appraisals.read().get(&id).cloned())
    }

    async fn find_visible(&self, predicate: &VisibilityPredicate) -> RepoResult<Vec<Appraisal>> {
        Ok(self
            .appraisals
            .read()
            .values()
            .filter(|a| predicate.matches(a))
            .cloned()
            .collect())
    }

    async fn find_for_triple(&self, key: &DraftKey) -> RepoResult<Vec<Appraisal>> {
        Ok(self
            .appraisals
            .read()
            .values()
            .filter(|a| key.matches(a))
            .cloned()
            .collect())
    }

    async fn create(&self, mut appraisal: Appraisal) -> RepoResult<Appraisal> {
        let mut appraisals = self.appraisals.write();
        appraisal.id = self.next_id();
        if let Some(existing) = conflicting_draft(&appraisals, &appraisal) {
            return Err(RepoError::Duplicate(format!(
                "Draft appraisal {} already exists",
                existing.id
            )));
        }
        appraisals.insert(appraisal.id, appraisal.clone());
        Ok(appraisal)
    }

    async fn update(&self, appraisal: Appraisal) -> RepoResult<Appraisal> {
        let mut appraisals = self.appraisals.write();
        if !appraisals.contains_key(&appraisal.id) {
            return Err(RepoError::NotFound(format!("Appraisal {}", appraisal.id)));
        }
        if let Some(existing) = conflicting_draft(&appraisals, &appraisal) {
            return Err(RepoError::Duplicate(format!(
                "Draft appraisal {} already exists",
                existing.id
            )));
        }
        appraisals.insert(appraisal.id, appraisal.clone());
        Ok(appraisal)
    }
}
