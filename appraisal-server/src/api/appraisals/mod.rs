//! Appraisal API Module
//!
//! | Path | Method | Handler |
//! |------|--------|---------|
//! | /api/appraisals | GET | list visible appraisals (`?employee_id=`) |
//! | /api/appraisals | POST | save (create, merge draft, or update by id) |
//! | /api/appraisals/{id} | GET | fetch one |
//! | /api/appraisals/{id}/transition | POST | change status |
//!
//! Every route requires a bearer token.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Appraisal router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/appraisals", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::save))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/transition", post(handler::transition))
}
