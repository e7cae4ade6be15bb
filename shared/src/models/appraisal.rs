//! Appraisal Model
//!
//! Wire and storage types for one performance review cycle of one employee.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::types::{AccountId, EmployeeId, Timestamp};

/// Default appraisal type when the caller does not name one
pub const DEFAULT_APPRAISAL_TYPE: &str = "annual";

/// Appraisal lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppraisalStatus {
    #[default]
    Draft,
    Submitted,
    SupervisorReview,
    ReviewerAssessment,
    RevisionRequested,
    Approved,
    Rejected,
}

impl AppraisalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::SupervisorReview => "supervisor_review",
            Self::ReviewerAssessment => "reviewer_assessment",
            Self::RevisionRequested => "revision_requested",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// `approved` and `rejected` are final
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// States in which a supervisor or reviewer holds the record
    pub fn is_under_review(&self) -> bool {
        matches!(
            self,
            Self::Submitted | Self::SupervisorReview | Self::ReviewerAssessment
        )
    }

    /// States the owning employee may still edit
    pub fn is_editable_by_owner(&self) -> bool {
        matches!(self, Self::Draft | Self::RevisionRequested)
    }
}

impl fmt::Display for AppraisalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assessment content as received from callers
///
/// Older clients send the document pre-serialized as a string. Everything
/// past the request boundary works on [`AssessmentDocument::into_document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssessmentDocument {
    RawText(String),
    Structured(Value),
}

impl AssessmentDocument {
    /// Normalize to a structured document
    ///
    /// Raw text holding a JSON object or array is parsed; any other text is
    /// wrapped as `{"text": ...}`. Blank text becomes an empty object.
    pub fn into_document(self) -> Value {
        match self {
            Self::Structured(value) => value,
            Self::RawText(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Value::Object(Default::default());
                }
                match serde_json::from_str::<Value>(trimmed) {
                    Ok(value @ (Value::Object(_) | Value::Array(_))) => value,
                    _ => serde_json::json!({ "text": text }),
                }
            }
        }
    }
}

impl From<Value> for AssessmentDocument {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// Free-text comments attached to an appraisal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppraisalComments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

impl AppraisalComments {
    /// Overlay the fields present in `other`
    pub fn merge(&mut self, other: AppraisalComments) {
        if other.employee_comments.is_some() {
            self.employee_comments = other.employee_comments;
        }
        if other.supervisor_comments.is_some() {
            self.supervisor_comments = other.supervisor_comments;
        }
        if other.reviewer_comments.is_some() {
            self.reviewer_comments = other.reviewer_comments;
        }
        if other.recommendations.is_some() {
            self.recommendations = other.recommendations;
        }
    }
}

/// Appraisal entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appraisal {
    pub id: i64,
    pub employee_id: EmployeeId,
    pub plan_id: i64,
    /// Approving account on the supervisor side; `None` until known
    pub supervisor_account_id: Option<AccountId>,
    pub reviewer_account_id: Option<AccountId>,
    pub appraisal_type: String,
    pub status: AppraisalStatus,
    /// Absent until the appraisal is rated
    pub overall_rating: Option<f64>,
    pub self_assessment: Option<Value>,
    pub supervisor_assessment: Option<Value>,
    pub value_assessment: Option<Value>,
    #[serde(default)]
    pub comments: AppraisalComments,
    pub submitted_at: Option<Timestamp>,
    pub supervisor_approved_at: Option<Timestamp>,
    pub reviewer_approved_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial appraisal content supplied by a save
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppraisalPatch {
    #[serde(default)]
    pub overall_rating: Option<f64>,
    #[serde(default)]
    pub self_assessment: Option<AssessmentDocument>,
    #[serde(default)]
    pub supervisor_assessment: Option<AssessmentDocument>,
    #[serde(default)]
    pub value_assessment: Option<AssessmentDocument>,
    #[serde(default)]
    pub comments: Option<AppraisalComments>,
}

/// How a save names the appraised employee
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeRef {
    Id(EmployeeId),
    Email(String),
}

/// Save appraisal request
///
/// With `id` set this updates that record; otherwise the employee/plan/type
/// triple selects (or creates) the single active draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveAppraisalInput {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub employee_email: Option<String>,
    #[serde(default)]
    pub plan_id: Option<i64>,
    #[serde(default)]
    pub appraisal_type: Option<String>,
    /// Requested status (defaults to the current one, or `draft` on create)
    #[serde(default)]
    pub status: Option<AppraisalStatus>,
    #[serde(flatten)]
    pub patch: AppraisalPatch,
}

impl SaveAppraisalInput {
    /// Employee reference, id preferred over email
    pub fn employee_ref(&self) -> Option<EmployeeRef> {
        match (&self.employee_id, &self.employee_email) {
            (Some(id), _) => Some(EmployeeRef::Id(*id)),
            (None, Some(email)) if !email.trim().is_empty() => {
                Some(EmployeeRef::Email(email.trim().to_string()))
            }
            _ => None,
        }
    }
}

/// Status advance request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: AppraisalStatus,
    #[serde(default)]
    pub comment: Option<String>,
}

/// List query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAppraisalsQuery {
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
}

/// Appraisal counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub draft: usize,
    pub submitted: usize,
    pub supervisor_review: usize,
    pub reviewer_assessment: usize,
    pub revision_requested: usize,
    pub approved: usize,
    pub rejected: usize,
    /// submitted + supervisor_review + reviewer_assessment
    pub pending: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: AppraisalStatus) {
        match status {
            AppraisalStatus::Draft => self.draft += 1,
            AppraisalStatus::Submitted => self.submitted += 1,
            AppraisalStatus::SupervisorReview => self.supervisor_review += 1,
            AppraisalStatus::ReviewerAssessment => self.reviewer_assessment += 1,
            AppraisalStatus::RevisionRequested => self.revision_requested += 1,
            AppraisalStatus::Approved => self.approved += 1,
            AppraisalStatus::Rejected => self.rejected += 1,
        }
        if status.is_under_review() {
            self.pending += 1;
        }
        self.total += 1;
    }
}

impl<'a> FromIterator<&'a Appraisal> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = &'a Appraisal>>(iter: I) -> Self {
        let mut counts = StatusCounts::default();
        for appraisal in iter {
            counts.record(appraisal.status);
        }
        counts
    }
}

/// List response: visible appraisals plus their status statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppraisalList {
    pub appraisals: Vec<Appraisal>,
    pub statistics: StatusCounts,
}
