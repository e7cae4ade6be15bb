//! Database Module
//!
//! Storage ports and the in-process store backing them

pub mod repository;

pub use repository::{
    AccountDirectory, AppraisalStore, EmployeeDirectory, MemoryStore, PlanStore, RepoError,
    RepoResult,
};
