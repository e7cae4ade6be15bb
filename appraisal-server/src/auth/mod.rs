//! Authentication and authorization
//!
//! - [`JwtService`] issues and validates bearer tokens
//! - [`CurrentUser`] is the request extractor for the acting account
//! - [`RoleTable`] maps roles to appraisal permissions

pub mod extractor;
pub mod jwt;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use permissions::{RoleTable, default_permissions, required_permission};
