//! Utilities - logging, input validation, shared error re-exports
//!
//! - [`AppError`] - caller-facing error (from shared::error)
//! - [`ApiResponse`] - response envelope (from shared::error)

pub mod logger;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
