//! Shared types for the appraisal platform
//!
//! Common types used by the server and its callers: data models, the
//! unified error system, and id/time utilities.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use types::{AccountId, EmployeeId, Permission, Timestamp};
