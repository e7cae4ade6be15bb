//! Appraisal workflow scenarios
//!
//! Runs the service against the in-process store with a small org chart:
//!
//! ```text
//! 1  staff      account 10, supervisor 2, reviewer 3
//! 2  team_lead  account 20
//! 3  manager    account 30
//! 4  staff      account 40, supervisor 2
//! 5  hr_officer account 50
//! 6  staff      account 60, supervisor 2
//! 7  staff      account 70, no supervisor
//! 8  staff      account 80, supervisor 9 (no account)
//! 9  contractor, no account
//! ```

use appraisal_server::appraisals::{AppraisalError, AppraisalService, Repositories};
use appraisal_server::auth::RoleTable;
use appraisal_server::db::{AppraisalStore, MemoryStore, PlanStore};
use serde_json::json;
use shared::models::{
    Account, Appraisal, AppraisalComments, AppraisalPatch, AppraisalStatus, AssessmentDocument,
    Employee, PlanCreate, Role, SaveAppraisalInput, TransitionRequest,
};
use std::sync::Arc;

fn employee(
    id: i64,
    account: Option<i64>,
    supervisor: Option<i64>,
    reviewer: Option<i64>,
) -> Employee {
    Employee {
        id,
        name: format!("Employee {id}"),
        email: format!("employee{id}@example.com"),
        account_id: account,
        supervisor_id: supervisor,
        reviewer_id: reviewer,
        department: Some("Engineering".to_string()),
        position: None,
    }
}

fn setup_with(roles: RoleTable) -> (Arc<MemoryStore>, Arc<AppraisalService>) {
    let store = Arc::new(MemoryStore::new());
    let people = [
        (1, Some(2), Some(3), Role::Staff),
        (2, None, None, Role::TeamLead),
        (3, None, None, Role::Manager),
        (4, Some(2), None, Role::Staff),
        (5, None, None, Role::HrOfficer),
        (6, Some(2), None, Role::Staff),
        (7, None, None, Role::Staff),
        (8, Some(9), None, Role::Staff),
    ];
    for (id, supervisor, reviewer, role) in people {
        store.insert_employee(employee(id, Some(id * 10), supervisor, reviewer));
        store.insert_account(Account {
            id: id * 10,
            username: format!("user{id}"),
            role,
            is_active: true,
        });
    }
    store.insert_employee(employee(9, None, None, None));

    let service =
        AppraisalService::new(Repositories::from_shared(store.clone()), Arc::new(roles));
    (store, Arc::new(service))
}

fn setup() -> (Arc<MemoryStore>, Arc<AppraisalService>) {
    setup_with(RoleTable::defaults())
}

fn self_assessment() -> AssessmentDocument {
    AssessmentDocument::Structured(json!({
        "achievements": "Cut build times in half",
        "ratings": {"delivery": 4, "collaboration": 5}
    }))
}

fn complete(status: Option<AppraisalStatus>) -> SaveAppraisalInput {
    SaveAppraisalInput {
        status,
        patch: AppraisalPatch {
            overall_rating: Some(4.5),
            self_assessment: Some(self_assessment()),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_ordinary_roles_see_only_related_appraisals() {
    let (_, service) = setup();
    service.save_appraisal(10, Role::Staff, complete(None)).await.unwrap();
    service.save_appraisal(60, Role::Staff, complete(None)).await.unwrap();

    // Unrelated staff sees nothing
    let list = service.list_appraisals(40, Role::Staff, None).await.unwrap();
    assert!(list.appraisals.is_empty());
    assert_eq!(list.statistics.total, 0);

    // Supervisor of both
    let list = service.list_appraisals(20, Role::TeamLead, None).await.unwrap();
    let mut employees: Vec<i64> = list.appraisals.iter().map(|a| a.employee_id).collect();
    employees.sort();
    assert_eq!(employees, vec![1, 6]);

    // Reviewer of employee 1 only
    let list = service.list_appraisals(30, Role::Manager, None).await.unwrap();
    assert_eq!(list.appraisals.len(), 1);
    assert_eq!(list.appraisals[0].employee_id, 1);
}

#[tokio::test]
async fn test_employee_filter_never_widens() {
    let (_, service) = setup();
    service.save_appraisal(10, Role::Staff, complete(None)).await.unwrap();

    let list = service.list_appraisals(40, Role::Staff, Some(1)).await.unwrap();
    assert!(list.appraisals.is_empty());
}

#[tokio::test]
async fn test_hr_sees_everything_and_filter_narrows() {
    let (_, service) = setup();
    for account in [10, 40, 60] {
        service
            .save_appraisal(account, Role::Staff, complete(None))
            .await
            .unwrap();
    }

    let all = service.list_appraisals(50, Role::HrOfficer, None).await.unwrap();
    assert_eq!(all.appraisals.len(), 3);
    assert_eq!(all.statistics.draft, 3);

    let filtered = service
        .list_appraisals(50, Role::HrOfficer, Some(4))
        .await
        .unwrap();
    assert_eq!(filtered.appraisals.len(), 1);
    assert!(filtered.appraisals.iter().all(|a| a.employee_id == 4));
}

#[tokio::test]
async fn test_hr_role_set_is_configurable() {
    let (_, service) = setup_with(RoleTable::with_hr_roles(&[Role::Manager]));
    service.save_appraisal(40, Role::Staff, complete(None)).await.unwrap();

    let hr = service.list_appraisals(50, Role::HrOfficer, None).await.unwrap();
    assert!(hr.appraisals.is_empty());

    let manager = service.list_appraisals(30, Role::Manager, None).await.unwrap();
    assert_eq!(manager.appraisals.len(), 1);
}

#[tokio::test]
async fn test_repeated_draft_saves_reuse_one_record() {
    let (store, service) = setup();
    let first = service.save_appraisal(10, Role::Staff, complete(None)).await.unwrap();
    let second = service.save_appraisal(10, Role::Staff, complete(None)).await.unwrap();
    let third = service.save_appraisal(10, Role::Staff, complete(None)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.id, third.id);
    assert_eq!(third.status, AppraisalStatus::Draft);
    assert_eq!(store.appraisal_count(), 1);
    assert_eq!(store.plan_count(), 1);
}

#[tokio::test]
async fn test_submission_requires_overall_rating() {
    let (store, service) = setup();
    let mut input = complete(Some(AppraisalStatus::Submitted));
    input.patch.overall_rating = None;

    let err = service.save_appraisal(10, Role::Staff, input).await.unwrap_err();
    let AppraisalError::Validation(fields) = err else {
        panic!("expected validation error");
    };
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].field, "overall_rating");
    assert_eq!(store.appraisal_count(), 0);
    assert_eq!(store.plan_count(), 0);
}

#[tokio::test]
async fn test_incomplete_submission_lists_every_field() {
    let (_, service) = setup();
    let input = SaveAppraisalInput {
        status: Some(AppraisalStatus::Submitted),
        ..Default::default()
    };

    let Err(AppraisalError::Validation(fields)) =
        service.save_appraisal(10, Role::Staff, input).await
    else {
        panic!("expected validation error");
    };
    let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "self_assessment.achievements",
            "self_assessment.ratings",
            "overall_rating"
        ]
    );
}

#[tokio::test]
async fn test_second_create_after_submit_reports_existing_id() {
    let (store, service) = setup();
    let submitted = service
        .save_appraisal(10, Role::Staff, complete(Some(AppraisalStatus::Submitted)))
        .await
        .unwrap();
    assert_eq!(submitted.status, AppraisalStatus::Submitted);
    assert!(submitted.submitted_at.is_some());

    let err = service
        .save_appraisal(10, Role::Staff, complete(None))
        .await
        .unwrap_err();
    match err {
        AppraisalError::DuplicateSubmission { existing_id } => {
            assert_eq!(existing_id, submitted.id)
        }
        other => panic!("expected duplicate submission, got {other:?}"),
    }
    assert_eq!(store.appraisal_count(), 1);

    // A different appraisal type is a different triple
    let probation = service
        .save_appraisal(
            10,
            Role::Staff,
            SaveAppraisalInput {
                appraisal_type: Some("probation".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_ne!(probation.id, submitted.id);
}

#[tokio::test]
async fn test_employee_level_supervision_grants_visibility() {
    let (store, service) = setup();
    // Plan names the manager as approver; the team lead supervises employee 6
    // only through the employee record.
    let plan = PlanStore::create(
        store.as_ref(),
        PlanCreate {
            employee_id: 6,
            supervisor_account_id: 30,
            reviewer_account_id: None,
            year: 2026,
            period_label: "2026 Annual".to_string(),
        },
    )
    .await
    .unwrap();

    let saved = service
        .save_appraisal(
            60,
            Role::Staff,
            SaveAppraisalInput {
                plan_id: Some(plan.id),
                ..complete(None)
            },
        )
        .await
        .unwrap();
    assert_eq!(saved.supervisor_account_id, Some(30));

    let list = service.list_appraisals(20, Role::TeamLead, None).await.unwrap();
    assert_eq!(list.appraisals.len(), 1);
    assert_eq!(list.appraisals[0].id, saved.id);
    assert!(service.get_appraisal(20, Role::TeamLead, saved.id).await.is_ok());
}

#[tokio::test]
async fn test_supervisor_sees_record_without_approver_accounts() {
    let (store, service) = setup();
    let plan = PlanStore::create(
        store.as_ref(),
        PlanCreate {
            employee_id: 6,
            supervisor_account_id: 20,
            reviewer_account_id: None,
            year: 2026,
            period_label: "2026 Annual".to_string(),
        },
    )
    .await
    .unwrap();
    // Imported record: no approver accounts copied onto the appraisal yet
    let imported = AppraisalStore::create(
        store.as_ref(),
        Appraisal {
            id: 0,
            employee_id: 6,
            plan_id: plan.id,
            supervisor_account_id: None,
            reviewer_account_id: None,
            appraisal_type: "annual".to_string(),
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
            created_at: 1,
            updated_at: 1,
        },
    )
    .await
    .unwrap();

    let list = service.list_appraisals(20, Role::TeamLead, None).await.unwrap();
    let ids: Vec<i64> = list.appraisals.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![imported.id]);
    assert!(service.get_appraisal(20, Role::TeamLead, imported.id).await.is_ok());

    // Nobody else is linked to employee 6
    let list = service.list_appraisals(30, Role::Manager, None).await.unwrap();
    assert!(list.appraisals.is_empty());
}

#[tokio::test]
async fn test_owner_cannot_overwrite_supervisor_comments() {
    let (_, service) = setup();
    let draft = service.save_appraisal(10, Role::Staff, complete(None)).await.unwrap();
    service
        .transition_appraisal(
            20,
            Role::TeamLead,
            draft.id,
            TransitionRequest {
                status: AppraisalStatus::Draft,
                comment: Some("needs work".to_string()),
            },
        )
        .await
        .unwrap();

    let resaved = service
        .save_appraisal(
            10,
            Role::Staff,
            SaveAppraisalInput {
                patch: AppraisalPatch {
                    comments: Some(AppraisalComments {
                        supervisor_comments: Some("owner wrote this".to_string()),
                        employee_comments: Some("fixed the goals".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(resaved.id, draft.id);
    assert_eq!(
        resaved.comments.supervisor_comments.as_deref(),
        Some("needs work")
    );
    assert_eq!(
        resaved.comments.employee_comments.as_deref(),
        Some("fixed the goals")
    );
}

#[tokio::test]
async fn test_owner_save_keeps_supervisor_assessment() {
    let (_, service) = setup();
    let draft = service.save_appraisal(10, Role::Staff, complete(None)).await.unwrap();

    service
        .save_appraisal(
            20,
            Role::TeamLead,
            SaveAppraisalInput {
                id: Some(draft.id),
                patch: AppraisalPatch {
                    supervisor_assessment: Some(AssessmentDocument::Structured(
                        json!({"strengths": "Mentoring"}),
                    )),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // The employee re-saves and tries to overwrite the supervisor's section
    let resaved = service
        .save_appraisal(
            10,
            Role::Staff,
            SaveAppraisalInput {
                patch: AppraisalPatch {
                    self_assessment: Some(AssessmentDocument::RawText(
                        r#"{"achievements": "Updated", "ratings": {"delivery": 5}}"#.to_string(),
                    )),
                    supervisor_assessment: Some(AssessmentDocument::RawText(
                        "I am great".to_string(),
                    )),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(resaved.id, draft.id);
    assert_eq!(
        resaved.supervisor_assessment,
        Some(json!({"strengths": "Mentoring"}))
    );
    assert_eq!(
        resaved.self_assessment,
        Some(json!({"achievements": "Updated", "ratings": {"delivery": 5}}))
    );
    assert_eq!(resaved.overall_rating, Some(4.5));
}

#[tokio::test]
async fn test_missing_supervisor_account_blocks_provisioning() {
    let (store, service) = setup();

    for account in [70, 80] {
        let err = service
            .save_appraisal(account, Role::Staff, complete(None))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppraisalError::MissingSupervisorAccount { .. }),
            "account {account}: {err:?}"
        );
    }
    assert_eq!(store.plan_count(), 0);
    assert_eq!(store.appraisal_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_create_one_appraisal() {
    let (store, service) = setup();

    let handles = (0..24).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            let mut input = complete(None);
            input.patch.overall_rating = Some(f64::from(i % 5));
            service.save_appraisal(10, Role::Staff, input).await
        })
    });
    let results = futures::future::join_all(handles).await;

    let mut ids: Vec<i64> = results
        .into_iter()
        .map(|r| r.expect("task panicked").expect("save failed").id)
        .collect();
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(store.appraisal_count(), 1);
    assert_eq!(store.plan_count(), 1);
}

#[tokio::test]
async fn test_full_review_cycle_and_terminal_states() {
    let (_, service) = setup();
    let appraisal = service
        .save_appraisal(10, Role::Staff, complete(Some(AppraisalStatus::Submitted)))
        .await
        .unwrap();
    let move_to = |status| TransitionRequest {
        status,
        comment: None,
    };

    service
        .transition_appraisal(
            20,
            Role::TeamLead,
            appraisal.id,
            move_to(AppraisalStatus::SupervisorReview),
        )
        .await
        .unwrap();
    service
        .transition_appraisal(
            20,
            Role::TeamLead,
            appraisal.id,
            move_to(AppraisalStatus::ReviewerAssessment),
        )
        .await
        .unwrap();
    let rejected = service
        .transition_appraisal(
            30,
            Role::Manager,
            appraisal.id,
            TransitionRequest {
                status: AppraisalStatus::Rejected,
                comment: Some("Goals were not agreed".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, AppraisalStatus::Rejected);
    assert_eq!(
        rejected.comments.reviewer_comments.as_deref(),
        Some("Goals were not agreed")
    );

    let err = service
        .transition_appraisal(
            50,
            Role::HrOfficer,
            appraisal.id,
            move_to(AppraisalStatus::Draft),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppraisalError::InvalidTransition {
            from: AppraisalStatus::Rejected,
            to: AppraisalStatus::Draft
        }
    ));
}

#[tokio::test]
async fn test_hr_may_reopen_a_revision() {
    let (_, service) = setup();
    let appraisal = service
        .save_appraisal(10, Role::Staff, complete(Some(AppraisalStatus::Submitted)))
        .await
        .unwrap();

    service
        .transition_appraisal(
            30,
            Role::Manager,
            appraisal.id,
            TransitionRequest {
                status: AppraisalStatus::RevisionRequested,
                comment: None,
            },
        )
        .await
        .unwrap();

    let reopened = service
        .transition_appraisal(
            50,
            Role::HrOfficer,
            appraisal.id,
            TransitionRequest {
                status: AppraisalStatus::Draft,
                comment: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(reopened.status, AppraisalStatus::Draft);
    // Submission time survives the round trip
    assert_eq!(reopened.submitted_at, appraisal.submitted_at);
}
