use shared::models::{DEFAULT_APPRAISAL_TYPE, Role};
use shared::{AppError, ErrorCode};

use crate::auth::{JwtConfig, RoleTable};

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | ENVIRONMENT | development | development, staging or production |
/// | LOG_LEVEL | info | tracing filter when `RUST_LOG` is unset |
/// | LOG_DIR | (none) | daily rolling log files go here when set |
/// | APPRAISAL_HR_ROLES | hr_officer,hr_manager,admin | roles that see every appraisal |
/// | DEFAULT_APPRAISAL_TYPE | annual | type used when a save names none |
/// | SEED_FILE | (none) | JSON file with employees and accounts to load at startup |
/// | JWT_SECRET, JWT_ISSUER, JWT_AUDIENCE, JWT_EXPIRATION_MINUTES | | token settings |
///
/// # Example
///
/// ```ignore
/// HTTP_PORT=8080 APPRAISAL_HR_ROLES=hr_manager,admin cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// `None` keeps the built-in HR roles
    pub hr_roles: Option<Vec<Role>>,
    pub default_appraisal_type: String,
    pub seed_file: Option<String>,
    pub jwt: JwtConfig,
}

fn config_error(message: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::ConfigError, message)
}

/// Parse a comma-separated role list
pub fn parse_role_list(raw: &str) -> Result<Vec<Role>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Role>()
                .map_err(|e| config_error(format!("APPRAISAL_HR_ROLES: {e}")))
        })
        .collect()
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Unset variables fall back to defaults; malformed values are errors.
    pub fn from_env() -> Result<Self, AppError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let allow_generated_secret = environment != "production";

        let hr_roles = match std::env::var("APPRAISAL_HR_ROLES") {
            Ok(raw) => Some(parse_role_list(&raw)?),
            Err(_) => None,
        };

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            hr_roles,
            default_appraisal_type: std::env::var("DEFAULT_APPRAISAL_TYPE")
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_APPRAISAL_TYPE.to_string()),
            seed_file: std::env::var("SEED_FILE").ok(),
            jwt: JwtConfig::from_env(allow_generated_secret)
                .map_err(|e| config_error(e.to_string()))?,
            environment,
        })
    }

    /// Defaults with a generated JWT secret, for tests and embedding
    pub fn for_tests() -> Self {
        Self {
            http_port: 0,
            environment: "development".into(),
            log_level: "debug".into(),
            log_dir: None,
            hr_roles: None,
            default_appraisal_type: DEFAULT_APPRAISAL_TYPE.to_string(),
            seed_file: None,
            jwt: JwtConfig::generated(),
        }
    }

    /// Role table built from `hr_roles`
    pub fn role_table(&self) -> RoleTable {
        match &self.hr_roles {
            Some(roles) => RoleTable::with_hr_roles(roles),
            None => RoleTable::defaults(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
