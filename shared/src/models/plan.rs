//! Performance Plan Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, EmployeeId, Timestamp};

/// Plan status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Active,
    Closed,
}

/// Yearly performance plan (one per employee per calendar year)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePlan {
    pub id: i64,
    pub employee_id: EmployeeId,
    /// Account that approves on the supervisor side
    pub supervisor_account_id: AccountId,
    pub reviewer_account_id: Option<AccountId>,
    pub year: i32,
    /// e.g. "2026 Annual"
    pub period_label: String,
    pub status: PlanStatus,
    /// Explicit review period; derived from `year` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    pub created_at: Timestamp,
}

impl PerformancePlan {
    /// Default label for a lazily provisioned plan
    pub fn default_period_label(year: i32) -> String {
        format!("{year} Annual")
    }

    /// Resolve the review period dates
    ///
    /// Explicit dates win when both are set; otherwise the calendar year is
    /// used. Returns `None` when the dates are inconsistent or the year is
    /// outside chrono's range.
    pub fn review_period(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => (start <= end).then_some((start, end)),
            (None, None) => {
                let start = NaiveDate::from_ymd_opt(self.year, 1, 1)?;
                let end = NaiveDate::from_ymd_opt(self.year, 12, 31)?;
                Some((start, end))
            }
            _ => None,
        }
    }
}

/// Create plan payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCreate {
    pub employee_id: EmployeeId,
    pub supervisor_account_id: AccountId,
    pub reviewer_account_id: Option<AccountId>,
    pub year: i32,
    pub period_label: String,
}
