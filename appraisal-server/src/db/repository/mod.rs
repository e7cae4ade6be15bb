//! Repository Module
//!
//! Storage ports used by the appraisal engine. The engine only talks to
//! these traits; [`MemoryStore`] is the in-process implementation.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use shared::models::{Account, Appraisal, Employee, PerformancePlan, PlanCreate};
use shared::{AccountId, AppError, EmployeeId};
use thiserror::Error;

use crate::appraisals::{DraftKey, VisibilityPredicate};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Employee records and their reporting lines
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;

    /// Case-insensitive email lookup
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Employee>>;

    /// Employee linked to a login account
    async fn find_by_account(&self, account_id: AccountId) -> RepoResult<Option<Employee>>;

    /// Employees whose `supervisor_id` is `supervisor`
    async fn find_supervised_by(&self, supervisor: EmployeeId) -> RepoResult<Vec<EmployeeId>>;

    /// Employees whose `reviewer_id` is `reviewer`
    async fn find_reviewed_by(&self, reviewer: EmployeeId) -> RepoResult<Vec<EmployeeId>>;
}

/// Login accounts
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn find_by_id(&self, id: AccountId) -> RepoResult<Option<Account>>;
}

/// Yearly performance plans
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<PerformancePlan>>;

    async fn find_for_year(
        &self,
        employee_id: EmployeeId,
        year: i32,
    ) -> RepoResult<Option<PerformancePlan>>;

    /// Fails with [`RepoError::Duplicate`] if the employee already has a plan
    /// for that year
    async fn create(&self, data: PlanCreate) -> RepoResult<PerformancePlan>;
}

/// Appraisal records
#[async_trait]
pub trait AppraisalStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Appraisal>>;

    /// Every appraisal the predicate admits, in no particular order
    async fn find_visible(&self, predicate: &VisibilityPredicate) -> RepoResult<Vec<Appraisal>>;

    /// Every appraisal (any status) for the employee/plan/type triple
    async fn find_for_triple(&self, key: &DraftKey) -> RepoResult<Vec<Appraisal>>;

    /// Persist a new appraisal; the store assigns `id`
    ///
    /// Fails with [`RepoError::Duplicate`] when a draft already exists for
    /// the same triple.
    async fn create(&self, appraisal: Appraisal) -> RepoResult<Appraisal>;

    async fn update(&self, appraisal: Appraisal) -> RepoResult<Appraisal>;
}
