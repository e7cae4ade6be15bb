//! API routes
//!
//! - [`health`] - liveness check
//! - [`appraisals`] - appraisal listing, saving and status changes

pub mod appraisals;
pub mod health;
