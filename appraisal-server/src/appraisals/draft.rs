//! Draft reconciliation
//!
//! Keeps at most one `draft` per (employee, plan, type) triple. Saves without
//! an appraisal id land here: the triple's draft is found and merged, or a
//! new one is created. A triple whose appraisal already left `draft` refuses
//! a second record with [`AppraisalError::DuplicateSubmission`].

use serde_json::Value;
use shared::models::{
    Appraisal, AppraisalComments, AppraisalPatch, AppraisalStatus, PerformancePlan,
};
use shared::{EmployeeId, Timestamp};
use std::sync::Arc;

use super::error::{AppraisalError, AppraisalResult};
use super::locks::{KeyedGuard, KeyedLocks};
use super::state_machine;
use crate::db::AppraisalStore;

/// Identity of an appraisal slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DraftKey {
    pub employee_id: EmployeeId,
    pub plan_id: i64,
    pub appraisal_type: String,
}

impl DraftKey {
    pub fn new(employee_id: EmployeeId, plan_id: i64, appraisal_type: impl Into<String>) -> Self {
        Self {
            employee_id,
            plan_id,
            appraisal_type: appraisal_type.into(),
        }
    }

    pub fn of(appraisal: &Appraisal) -> Self {
        Self::new(
            appraisal.employee_id,
            appraisal.plan_id,
            appraisal.appraisal_type.clone(),
        )
    }

    pub fn matches(&self, appraisal: &Appraisal) -> bool {
        appraisal.employee_id == self.employee_id
            && appraisal.plan_id == self.plan_id
            && appraisal.appraisal_type == self.appraisal_type
    }
}

/// Who is writing, which decides the fields a merge may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// The appraised employee; only the employee's own content is written
    SelfService,
    /// Supervisors, reviewers and HR
    Full,
}

/// A save's content with assessment documents already normalized
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppraisalChanges {
    pub overall_rating: Option<f64>,
    pub self_assessment: Option<Value>,
    pub supervisor_assessment: Option<Value>,
    pub value_assessment: Option<Value>,
    pub comments: Option<AppraisalComments>,
}

impl From<AppraisalPatch> for AppraisalChanges {
    fn from(patch: AppraisalPatch) -> Self {
        Self {
            overall_rating: patch.overall_rating,
            self_assessment: patch.self_assessment.map(|d| d.into_document()),
            supervisor_assessment: patch.supervisor_assessment.map(|d| d.into_document()),
            value_assessment: patch.value_assessment.map(|d| d.into_document()),
            comments: patch.comments,
        }
    }
}

impl AppraisalChanges {
    /// Overlay present fields onto `appraisal`
    pub fn apply(&self, appraisal: &mut Appraisal, mode: MergeMode) {
        if let Some(rating) = self.overall_rating {
            appraisal.overall_rating = Some(rating);
        }
        if let Some(doc) = &self.self_assessment {
            appraisal.self_assessment = Some(doc.clone());
        }
        if let Some(doc) = &self.value_assessment {
            appraisal.value_assessment = Some(doc.clone());
        }
        if mode == MergeMode::Full
            && let Some(doc) = &self.supervisor_assessment
        {
            appraisal.supervisor_assessment = Some(doc.clone());
        }
        if let Some(comments) = &self.comments {
            match mode {
                MergeMode::Full => appraisal.comments.merge(comments.clone()),
                MergeMode::SelfService => {
                    if let Some(text) = &comments.employee_comments {
                        appraisal.comments.employee_comments = Some(text.clone());
                    }
                }
            }
        }
    }

    /// Whether the save carries content the owner may not write
    pub fn touches_supervisor_side(&self) -> bool {
        self.supervisor_assessment.is_some()
            || self.comments.as_ref().is_some_and(|c| {
                c.supervisor_comments.is_some()
                    || c.reviewer_comments.is_some()
                    || c.recommendations.is_some()
            })
    }
}

/// Finds or creates the single draft for a triple
#[derive(Clone)]
pub struct DraftReconciler {
    store: Arc<dyn AppraisalStore>,
    locks: Arc<KeyedLocks<DraftKey>>,
}

impl DraftReconciler {
    pub fn new(store: Arc<dyn AppraisalStore>) -> Self {
        Self {
            store,
            locks: Arc::new(KeyedLocks::new()),
        }
    }

    /// Exclusive access to one triple
    ///
    /// Also taken by the update path so an edit by id and a save by triple
    /// cannot interleave.
    pub async fn lock(&self, key: &DraftKey) -> KeyedGuard<DraftKey> {
        self.locks.lock(key).await
    }

    /// Merge `changes` into the triple's draft, or create it
    ///
    /// Always merges in [`MergeMode::SelfService`]; supervisor-side content
    /// is written through the update-by-id path. `requested` is the status
    /// to move to (defaults to the draft's current status). The candidate
    /// passes the state machine before anything is written.
    pub async fn upsert_draft(
        &self,
        key: DraftKey,
        changes: &AppraisalChanges,
        requested: Option<AppraisalStatus>,
        plan: &PerformancePlan,
        now: Timestamp,
    ) -> AppraisalResult<Appraisal> {
        let _guard = self.lock(&key).await;
        let existing = self.store.find_for_triple(&key).await?;

        let mut drafts: Vec<&Appraisal> = existing
            .iter()
            .filter(|a| a.status == AppraisalStatus::Draft)
            .collect();
        drafts.sort_by_key(|a| std::cmp::Reverse((a.updated_at, a.id)));

        if let Some(current) = drafts.first() {
            if drafts.len() > 1 {
                tracing::warn!(
                    employee_id = key.employee_id,
                    plan_id = key.plan_id,
                    appraisal_type = %key.appraisal_type,
                    count = drafts.len(),
                    "Multiple drafts for one triple, merging into the newest"
                );
            }
            let mut candidate = (*current).clone();
            let target = requested.unwrap_or(candidate.status);
            changes.apply(&mut candidate, MergeMode::SelfService);
            state_machine::apply_transition(&mut candidate, target, plan, now)?;
            candidate.updated_at = now;

            let saved = self.store.update(candidate).await?;
            tracing::debug!(appraisal_id = saved.id, status = %saved.status, "Draft updated");
            return Ok(saved);
        }

        if let Some(submitted) = existing.iter().max_by_key(|a| (a.updated_at, a.id)) {
            tracing::warn!(
                employee_id = key.employee_id,
                existing_id = submitted.id,
                status = %submitted.status,
                "Refusing second appraisal for triple"
            );
            return Err(AppraisalError::DuplicateSubmission {
                existing_id: submitted.id,
            });
        }

        let candidate = Self::new_candidate(&key, changes, requested, plan, now)?;

        // The store still rejects a second draft if a writer bypassed the lock
        let saved = self.store.create(candidate).await?;
        tracing::info!(
            appraisal_id = saved.id,
            employee_id = saved.employee_id,
            plan_id = saved.plan_id,
            status = %saved.status,
            "Appraisal created"
        );
        Ok(saved)
    }

    /// The record a first save for `key` would create, checked against
    /// the state machine but not stored
    pub fn new_candidate(
        key: &DraftKey,
        changes: &AppraisalChanges,
        requested: Option<AppraisalStatus>,
        plan: &PerformancePlan,
        now: Timestamp,
    ) -> AppraisalResult<Appraisal> {
        let mut candidate = Appraisal {
            id: 0,
            employee_id: key.employee_id,
            plan_id: key.plan_id,
            supervisor_account_id: Some(plan.supervisor_account_id),
            reviewer_account_id: plan.reviewer_account_id,
            appraisal_type: key.appraisal_type.clone(),
            status: AppraisalStatus::Draft,
            overall_rating: None,
            self_assessment: None,
            supervisor_assessment: None,
            value_assessment: None,
            comments: AppraisalComments::default(),
            submitted_at: None,
            supervisor_approved_at: None,
            reviewer_approved_at: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };
        changes.apply(&mut candidate, MergeMode::SelfService);
        state_machine::apply_transition(
            &mut candidate,
            requested.unwrap_or(AppraisalStatus::Draft),
            plan,
            now,
        )?;
        Ok(candidate)
    }
}
