//! Appraisal service
//!
//! Entry point for every appraisal operation. Resolves the actor, applies
//! visibility and role gating, then hands off to the draft reconciler or
//! the state machine. Nothing is written until every check has passed.

use shared::models::{
    Account, Appraisal, AppraisalList, AppraisalStatus, EmployeeRef, PerformancePlan, Role,
    SaveAppraisalInput, StatusCounts, TransitionRequest, DEFAULT_APPRAISAL_TYPE,
};
use shared::util::{current_year, now_millis};
use shared::{AccountId, EmployeeId};
use std::sync::Arc;

use super::draft::{AppraisalChanges, DraftKey, DraftReconciler, MergeMode};
use super::error::{AppraisalError, AppraisalResult, Entity, FieldError};
use super::identity::{ActorContext, IdentityResolver};
use super::plan::{PlanProvisioner, PlanSlot};
use super::state_machine;
use super::visibility::VisibilityFilter;
use crate::auth::{RoleTable, required_permission};
use crate::db::{AccountDirectory, AppraisalStore, EmployeeDirectory, PlanStore};
use crate::utils::validation::{
    MAX_APPRAISAL_TYPE_LEN, MAX_COMMENT_LEN, MAX_EMAIL_LEN, validate_comments,
    validate_optional_text, validate_required_text,
};

/// Storage ports the service runs on
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountDirectory>,
    pub employees: Arc<dyn EmployeeDirectory>,
    pub plans: Arc<dyn PlanStore>,
    pub appraisals: Arc<dyn AppraisalStore>,
}

impl Repositories {
    /// All four ports served by one store
    pub fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: AccountDirectory + EmployeeDirectory + PlanStore + AppraisalStore + 'static,
    {
        Self {
            accounts: store.clone(),
            employees: store.clone(),
            plans: store.clone(),
            appraisals: store,
        }
    }
}

pub struct AppraisalService {
    accounts: Arc<dyn AccountDirectory>,
    employees: Arc<dyn EmployeeDirectory>,
    plans: Arc<dyn PlanStore>,
    appraisals: Arc<dyn AppraisalStore>,
    identity: IdentityResolver,
    visibility: VisibilityFilter,
    drafts: DraftReconciler,
    provisioner: PlanProvisioner,
    default_type: String,
}

impl AppraisalService {
    pub fn new(repos: Repositories, roles: Arc<RoleTable>) -> Self {
        Self {
            identity: IdentityResolver::new(repos.employees.clone()),
            visibility: VisibilityFilter::new(roles),
            drafts: DraftReconciler::new(repos.appraisals.clone()),
            provisioner: PlanProvisioner::new(repos.employees.clone(), repos.plans.clone()),
            accounts: repos.accounts,
            employees: repos.employees,
            plans: repos.plans,
            appraisals: repos.appraisals,
            default_type: DEFAULT_APPRAISAL_TYPE.to_string(),
        }
    }

    /// Appraisal type used when a save names none
    pub fn with_default_type(mut self, appraisal_type: impl Into<String>) -> Self {
        self.default_type = appraisal_type.into();
        self
    }

    pub fn role_table(&self) -> &RoleTable {
        self.visibility.roles()
    }

    /// The account must exist and be active
    pub async fn authenticate(&self, account_id: AccountId) -> AppraisalResult<Account> {
        match self.accounts.find_by_id(account_id).await? {
            Some(account) if account.is_active => Ok(account),
            Some(_) => {
                tracing::warn!(account_id, "Inactive account refused");
                Err(AppraisalError::Unauthorized(account_id))
            }
            None => {
                tracing::warn!(account_id, "Unknown account refused");
                Err(AppraisalError::Unauthorized(account_id))
            }
        }
    }

    async fn actor(&self, account_id: AccountId) -> AppraisalResult<ActorContext> {
        self.authenticate(account_id).await?;
        self.identity.resolve_actor_context(account_id).await
    }

    /// Appraisals visible to the actor, newest first, with status counts
    pub async fn list_appraisals(
        &self,
        account_id: AccountId,
        role: Role,
        employee_filter: Option<EmployeeId>,
    ) -> AppraisalResult<AppraisalList> {
        let actor = self.actor(account_id).await?;
        let predicate = self
            .visibility
            .build_predicate(&actor, role, employee_filter);

        let mut appraisals = self.appraisals.find_visible(&predicate).await?;
        appraisals.sort_by_key(|a| std::cmp::Reverse((a.created_at, a.id)));
        let statistics: StatusCounts = appraisals.iter().collect();

        tracing::debug!(
            account_id,
            role = %role,
            count = appraisals.len(),
            "Listed appraisals"
        );
        Ok(AppraisalList {
            appraisals,
            statistics,
        })
    }

    /// One appraisal, if the actor owns it or may see it
    pub async fn get_appraisal(
        &self,
        account_id: AccountId,
        role: Role,
        id: i64,
    ) -> AppraisalResult<Appraisal> {
        let actor = self.actor(account_id).await?;
        self.load_visible(&actor, role, id).await
    }

    /// Create or update an appraisal
    ///
    /// With `input.id` the record is edited in place; otherwise the
    /// (employee, plan, type) triple selects the draft to merge into.
    pub async fn save_appraisal(
        &self,
        account_id: AccountId,
        role: Role,
        input: SaveAppraisalInput,
    ) -> AppraisalResult<Appraisal> {
        let actor = self.actor(account_id).await?;
        match input.id {
            Some(id) => self.update_existing(&actor, role, id, input).await,
            None => self.save_by_triple(&actor, role, input).await,
        }
    }

    /// Move an appraisal to another status
    pub async fn transition_appraisal(
        &self,
        account_id: AccountId,
        role: Role,
        id: i64,
        request: TransitionRequest,
    ) -> AppraisalResult<Appraisal> {
        let actor = self.actor(account_id).await?;
        if let Some(err) = validate_optional_text(&request.comment, "comment", MAX_COMMENT_LEN) {
            return Err(AppraisalError::InvalidInput(vec![err]));
        }

        let seen = self.load_visible(&actor, role, id).await?;
        let _guard = self.drafts.lock(&DraftKey::of(&seen)).await;
        let mut appraisal = self.reload(id).await?;

        let from = appraisal.status;
        self.authorize_status_change(&actor, role, appraisal.employee_id, from, request.status)?;
        let plan = self.plan_for(&appraisal).await?;

        let now = now_millis();
        state_machine::apply_transition(&mut appraisal, request.status, &plan, now)?;
        if let Some(comment) = request.comment.filter(|c| !c.trim().is_empty()) {
            attach_comment(&mut appraisal, &actor, comment);
        }
        appraisal.updated_at = now;

        let saved = self.appraisals.update(appraisal).await?;
        tracing::info!(
            appraisal_id = saved.id,
            account_id = actor.account_id,
            from = %from,
            to = %saved.status,
            "Appraisal transitioned"
        );
        Ok(saved)
    }

    async fn update_existing(
        &self,
        actor: &ActorContext,
        role: Role,
        id: i64,
        input: SaveAppraisalInput,
    ) -> AppraisalResult<Appraisal> {
        let changes = AppraisalChanges::from(input.patch);
        if let Some(comments) = &changes.comments {
            let errors = validate_comments(comments);
            if !errors.is_empty() {
                return Err(AppraisalError::InvalidInput(errors));
            }
        }

        let seen = self.load_visible(actor, role, id).await?;
        let _guard = self.drafts.lock(&DraftKey::of(&seen)).await;
        let mut appraisal = self.reload(id).await?;

        let is_owner = actor.is_owner(appraisal.employee_id);
        let current = appraisal.status;
        let requested = input.status.unwrap_or(current);

        let has_changes = changes != AppraisalChanges::default();
        if is_owner && has_changes && !current.is_editable_by_owner() {
            tracing::warn!(appraisal_id = id, status = %current, "Owner edit refused");
            return Err(AppraisalError::Forbidden(format!(
                "appraisal {id} cannot be edited by its owner while {current}"
            )));
        }
        self.authorize_status_change(actor, role, appraisal.employee_id, current, requested)?;

        let mode = merge_mode(actor, appraisal.employee_id, &changes);

        let plan = self.plan_for(&appraisal).await?;
        let now = now_millis();
        changes.apply(&mut appraisal, mode);
        state_machine::apply_transition(&mut appraisal, requested, &plan, now)?;
        appraisal.updated_at = now;

        let saved = self.appraisals.update(appraisal).await?;
        tracing::info!(
            appraisal_id = saved.id,
            account_id = actor.account_id,
            status = %saved.status,
            "Appraisal updated"
        );
        Ok(saved)
    }

    async fn save_by_triple(
        &self,
        actor: &ActorContext,
        role: Role,
        input: SaveAppraisalInput,
    ) -> AppraisalResult<Appraisal> {
        let mut errors: Vec<FieldError> = Vec::new();

        let appraisal_type = input
            .appraisal_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.default_type.as_str())
            .to_string();
        errors.extend(validate_required_text(
            &appraisal_type,
            "appraisal_type",
            MAX_APPRAISAL_TYPE_LEN,
        ));
        if let Some(comments) = &input.patch.comments {
            errors.extend(validate_comments(comments));
        }
        if let Some(EmployeeRef::Email(email)) = input.employee_ref() {
            errors.extend(validate_required_text(&email, "employee_email", MAX_EMAIL_LEN));
        }
        if !errors.is_empty() {
            return Err(AppraisalError::InvalidInput(errors));
        }

        let employee_id = self.resolve_employee(actor, input.employee_ref()).await?;
        let requested = input.status.unwrap_or(AppraisalStatus::Draft);

        let explicit_plan = match input.plan_id {
            Some(plan_id) => Some(self.explicit_plan(plan_id, employee_id).await?),
            None => None,
        };
        let on_plan = explicit_plan.as_ref().is_some_and(|p| {
            p.supervisor_account_id == actor.account_id
                || p.reviewer_account_id == Some(actor.account_id)
        });
        if !(actor.is_owner(employee_id)
            || self.visibility.is_privileged(role)
            || actor.oversees(employee_id)
            || on_plan)
        {
            tracing::warn!(
                account_id = actor.account_id,
                employee_id,
                "Save for unrelated employee refused"
            );
            return Err(AppraisalError::Forbidden(format!(
                "no access to appraisals of employee {employee_id}"
            )));
        }
        self.authorize_status_change(actor, role, employee_id, AppraisalStatus::Draft, requested)?;

        let changes = AppraisalChanges::from(input.patch);
        if changes.touches_supervisor_side() {
            tracing::debug!(employee_id, "Ignoring supervisor-side fields on save by triple");
        }
        let plan = match explicit_plan {
            Some(plan) => plan,
            None => match self.provisioner.resolve(employee_id, current_year()).await? {
                PlanSlot::Existing(plan) => plan,
                PlanSlot::Pending(pending) => {
                    // A new plan has no appraisals, so this save creates one.
                    // Check that record before the plan is written.
                    let preview = pending.preview();
                    let key = DraftKey::new(employee_id, preview.id, appraisal_type.as_str());
                    DraftReconciler::new_candidate(
                        &key,
                        &changes,
                        input.status,
                        &preview,
                        now_millis(),
                    )?;
                    pending.persist().await?
                }
            },
        };

        let key = DraftKey::new(employee_id, plan.id, appraisal_type);
        self.drafts
            .upsert_draft(key, &changes, input.status, &plan, now_millis())
            .await
    }

    async fn resolve_employee(
        &self,
        actor: &ActorContext,
        reference: Option<EmployeeRef>,
    ) -> AppraisalResult<EmployeeId> {
        match reference {
            Some(EmployeeRef::Id(id)) => self
                .employees
                .find_by_id(id)
                .await?
                .map(|e| e.id)
                .ok_or_else(|| AppraisalError::not_found(Entity::Employee, id)),
            Some(EmployeeRef::Email(email)) => self
                .employees
                .find_by_email(&email)
                .await?
                .map(|e| e.id)
                .ok_or_else(|| AppraisalError::not_found(Entity::Employee, email)),
            None => actor.employee_id.ok_or_else(|| {
                AppraisalError::invalid_field(
                    "employee_id",
                    "An employee id or email is required for accounts without an employee record",
                )
            }),
        }
    }

    async fn explicit_plan(
        &self,
        plan_id: i64,
        employee_id: EmployeeId,
    ) -> AppraisalResult<PerformancePlan> {
        let plan = self
            .plans
            .find_by_id(plan_id)
            .await?
            .ok_or_else(|| AppraisalError::not_found(Entity::Plan, plan_id))?;
        if plan.employee_id != employee_id {
            return Err(AppraisalError::PlanMismatch {
                plan_id,
                employee_id,
            });
        }
        Ok(plan)
    }

    async fn plan_for(&self, appraisal: &Appraisal) -> AppraisalResult<PerformancePlan> {
        self.plans
            .find_by_id(appraisal.plan_id)
            .await?
            .ok_or_else(|| AppraisalError::not_found(Entity::Plan, appraisal.plan_id))
    }

    /// Load `id`, reporting records the actor may not see as missing
    async fn load_visible(
        &self,
        actor: &ActorContext,
        role: Role,
        id: i64,
    ) -> AppraisalResult<Appraisal> {
        let appraisal = self.reload(id).await?;
        let predicate = self.visibility.build_predicate(actor, role, None);
        if actor.is_owner(appraisal.employee_id) || predicate.matches(&appraisal) {
            Ok(appraisal)
        } else {
            tracing::debug!(
                account_id = actor.account_id,
                appraisal_id = id,
                "Appraisal hidden from actor"
            );
            Err(AppraisalError::not_found(Entity::Appraisal, id))
        }
    }

    async fn reload(&self, id: i64) -> AppraisalResult<Appraisal> {
        self.appraisals
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppraisalError::not_found(Entity::Appraisal, id))
    }

    /// Role gate for a status change
    ///
    /// Owner states (`draft`, `submitted`) are set by the employee or HR.
    /// Every later state needs the matching permission and is never set by
    /// the appraised employee.
    fn authorize_status_change(
        &self,
        actor: &ActorContext,
        role: Role,
        employee_id: EmployeeId,
        current: AppraisalStatus,
        requested: AppraisalStatus,
    ) -> AppraisalResult<()> {
        if current == requested {
            return Ok(());
        }

        match required_permission(requested) {
            None if actor.is_owner(employee_id) || self.visibility.is_privileged(role) => Ok(()),
            None => Err(AppraisalError::Forbidden(format!(
                "only the employee or HR may move an appraisal to {requested}"
            ))),
            Some(_) if actor.is_owner(employee_id) => Err(AppraisalError::Forbidden(format!(
                "employees cannot move their own appraisal to {requested}"
            ))),
            Some(permission) if !self.role_table().has(role, permission) => {
                tracing::warn!(
                    account_id = actor.account_id,
                    role = %role,
                    permission = %permission,
                    "Status change refused"
                );
                Err(AppraisalError::Forbidden(format!(
                    "{permission} is required to move an appraisal to {requested}"
                )))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Owners write only their own side of the appraisal
fn merge_mode(
    actor: &ActorContext,
    employee_id: EmployeeId,
    changes: &AppraisalChanges,
) -> MergeMode {
    if !actor.is_owner(employee_id) {
        return MergeMode::Full;
    }
    if changes.touches_supervisor_side() {
        tracing::debug!(employee_id, "Ignoring supervisor-side fields from owner");
    }
    MergeMode::SelfService
}

/// File a transition comment under the actor's side of the appraisal
fn attach_comment(appraisal: &mut Appraisal, actor: &ActorContext, comment: String) {
    let slot = if actor.is_owner(appraisal.employee_id) {
        &mut appraisal.comments.employee_comments
    } else if appraisal.reviewer_account_id == Some(actor.account_id) {
        &mut appraisal.comments.reviewer_comments
    } else {
        &mut appraisal.comments.supervisor_comments
    };
    *slot = Some(comment);
}
