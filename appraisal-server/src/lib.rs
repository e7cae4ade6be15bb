//! Appraisal Server - performance appraisal workflow engine
//!
//! # Overview
//!
//! - **Appraisals** (`appraisals`): lifecycle state machine, draft
//!   reconciliation, plan provisioning and role-based visibility
//! - **Storage** (`db`): repository ports and the in-process store
//! - **Auth** (`auth`): JWT bearer tokens, role permission table
//! - **HTTP API** (`api`): REST routes over the appraisal service
//!
//! # Layout
//!
//! ```text
//! appraisal-server/src/
//! ├── core/          # config, state, server, errors
//! ├── auth/          # JWT, extractor, role permissions
//! ├── appraisals/    # workflow engine
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # repository traits and memory store
//! └── utils/         # logging, validation
//! ```

pub mod api;
pub mod appraisals;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export public types
pub use appraisals::{AppraisalError, AppraisalService};
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use db::MemoryStore;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - accepts tracing field syntax
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Start logging with the configured level and directory
pub fn setup_environment(config: &Config) {
    init_logger_with_file(&config.log_level, config.log_dir.as_deref());
}
