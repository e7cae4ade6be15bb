//! Data models
//!
//! Shared between the appraisal server and its callers (via API).
//! All IDs are `i64`, all timestamps Unix milliseconds.

pub mod appraisal;
pub mod employee;
pub mod plan;

// Re-exports
pub use appraisal::*;
pub use employee::*;
pub use plan::*;
