//! Appraisal workflow engine
//!
//! - [`identity`] resolves who is acting and whom they oversee
//! - [`visibility`] decides which appraisals an actor may see
//! - [`state_machine`] owns the lifecycle graph and submission checks
//! - [`draft`] keeps one draft per (employee, plan, type)
//! - [`plan`] provisions yearly performance plans
//! - [`service`] wires them into the public operations

pub mod draft;
pub mod error;
pub mod identity;
pub mod locks;
pub mod plan;
pub mod service;
pub mod state_machine;
pub mod visibility;

pub use draft::{AppraisalChanges, DraftKey, DraftReconciler, MergeMode};
pub use error::{AppraisalError, AppraisalResult, Entity, FieldError};
pub use identity::{ActorContext, IdentityResolver};
pub use plan::{PendingPlan, PlanProvisioner, PlanSlot};
pub use service::{AppraisalService, Repositories};
pub use visibility::{Scope, VisibilityFilter, VisibilityPredicate};
