//! Appraisal lifecycle
//!
//! ```text
//! draft -> submitted -> supervisor_review -> reviewer_assessment -> approved
//!
//! submitted | supervisor_review | reviewer_assessment -> revision_requested
//! submitted | supervisor_review | reviewer_assessment -> rejected
//! revision_requested -> draft | submitted
//! ```
//!
//! Staying in a non-terminal state is a legal no-op (saving edits). Only
//! entering `submitted` is gated on content; every other edge is gated by
//! role in the service.

use serde_json::Value;
use shared::models::{Appraisal, AppraisalStatus, PerformancePlan};
use shared::Timestamp;

use super::error::{AppraisalError, AppraisalResult, FieldError};

/// Whether `from → to` is an edge of the lifecycle graph
pub fn can_transition(from: AppraisalStatus, to: AppraisalStatus) -> bool {
    use AppraisalStatus::*;

    if from == to {
        return !from.is_terminal();
    }
    match (from, to) {
        (Draft, Submitted) => true,
        (RevisionRequested, Draft | Submitted) => true,
        (Submitted, SupervisorReview) => true,
        (SupervisorReview, ReviewerAssessment) => true,
        (ReviewerAssessment, Approved) => true,
        (from, RevisionRequested | Rejected) => from.is_under_review(),
        _ => false,
    }
}

/// A present, non-blank value
fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

fn section<'a>(document: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    document.and_then(|doc| doc.get(key))
}

/// Every reason `candidate` cannot be submitted, in field order
pub fn submission_errors(candidate: &Appraisal, plan: &PerformancePlan) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let self_assessment = candidate.self_assessment.as_ref();
    if !is_filled(section(self_assessment, "achievements")) {
        errors.push(FieldError::new(
            "self_assessment.achievements",
            "Achievements are required before submitting",
        ));
    }

    let has_ratings = is_filled(section(self_assessment, "ratings"))
        || is_filled(section(candidate.value_assessment.as_ref(), "ratings"));
    if !has_ratings {
        errors.push(FieldError::new(
            "self_assessment.ratings",
            "At least one performance rating is required",
        ));
    }

    match candidate.overall_rating {
        None => errors.push(FieldError::new(
            "overall_rating",
            "Overall rating is required",
        )),
        Some(rating) if !rating.is_finite() || rating < 0.0 => errors.push(FieldError::new(
            "overall_rating",
            "Overall rating must be a non-negative number",
        )),
        Some(_) => {}
    }

    if plan.review_period().is_none() {
        errors.push(FieldError::new(
            "plan.review_period",
            format!("Review period of plan {} cannot be resolved", plan.id),
        ));
    }

    errors
}

/// Check that `candidate` may move from `current` to `requested`
pub fn validate_transition(
    current: AppraisalStatus,
    requested: AppraisalStatus,
    candidate: &Appraisal,
    plan: &PerformancePlan,
) -> AppraisalResult<()> {
    if !can_transition(current, requested) {
        return Err(AppraisalError::InvalidTransition {
            from: current,
            to: requested,
        });
    }

    if requested == AppraisalStatus::Submitted && current != AppraisalStatus::Submitted {
        let errors = submission_errors(candidate, plan);
        if !errors.is_empty() {
            return Err(AppraisalError::Validation(errors));
        }
    }
    Ok(())
}

/// Validate and apply `requested` to `appraisal`, stamping milestone times
///
/// `appraisal.status` is the current state; it is left untouched on error.
pub fn apply_transition(
    appraisal: &mut Appraisal,
    requested: AppraisalStatus,
    plan: &PerformancePlan,
    now: Timestamp,
) -> AppraisalResult<()> {
    validate_transition(appraisal.status, requested, appraisal, plan)?;

    appraisal.status = requested;
    match requested {
        AppraisalStatus::Submitted => {
            appraisal.submitted_at.get_or_insert(now);
        }
        AppraisalStatus::ReviewerAssessment => {
            appraisal.supervisor_approved_at.get_or_insert(now);
        }
        AppraisalStatus::Approved => {
            appraisal.reviewer_approved_at.get_or_insert(now);
            appraisal.approved_at.get_or_insert(now);
        }
        _ => {}
    }
    Ok(())
}
