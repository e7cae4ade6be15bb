//! Appraisal API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{
    Appraisal, AppraisalList, ListAppraisalsQuery, SaveAppraisalInput, TransitionRequest,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// List appraisals visible to the caller
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListAppraisalsQuery>,
) -> AppResult<Json<AppraisalList>> {
    let list = state
        .appraisals
        .list_appraisals(user.account_id, user.role, query.employee_id)
        .await?;
    Ok(Json(list))
}

/// Get appraisal by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Appraisal>> {
    let appraisal = state
        .appraisals
        .get_appraisal(user.account_id, user.role, id)
        .await?;
    Ok(Json(appraisal))
}

/// Save an appraisal
pub async fn save(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SaveAppraisalInput>,
) -> AppResult<Json<Appraisal>> {
    let appraisal = state
        .appraisals
        .save_appraisal(user.account_id, user.role, payload)
        .await?;
    Ok(Json(appraisal))
}

/// Move an appraisal to another status
pub async fn transition(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<Json<Appraisal>> {
    let appraisal = state
        .appraisals
        .transition_appraisal(user.account_id, user.role, id, payload)
        .await?;
    Ok(Json(appraisal))
}
