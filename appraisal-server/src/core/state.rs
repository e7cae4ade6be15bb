use std::path::Path;
use std::sync::Arc;

use crate::appraisals::{AppraisalService, Repositories};
use crate::auth::JwtService;
use crate::core::{Config, Result, ServerError};
use crate::db::MemoryStore;

/// Server state - shared handles to every service
///
/// Cloned into each request; every field is cheap to clone.
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | immutable configuration |
/// | store | in-process store behind all repository ports |
/// | appraisals | the appraisal engine |
/// | jwt | token service |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<MemoryStore>,
    pub appraisals: Arc<AppraisalService>,
    pub jwt: Arc<JwtService>,
}

impl ServerState {
    /// Assemble state around an existing store
    pub fn new(config: Config, store: Arc<MemoryStore>) -> Self {
        let roles = Arc::new(config.role_table());
        let appraisals = AppraisalService::new(Repositories::from_shared(store.clone()), roles)
            .with_default_type(config.default_appraisal_type.clone());
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            store,
            appraisals: Arc::new(appraisals),
            jwt,
        }
    }

    /// Build state from configuration
    ///
    /// 1. Create the store
    /// 2. Load `SEED_FILE` into it, if configured
    /// 3. Wire the appraisal service and JWT service
    pub fn initialize(config: &Config) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());

        if let Some(seed) = &config.seed_file {
            let loaded = store
                .load_fixture(Path::new(seed))
                .map_err(|e| ServerError::Seed(e.to_string()))?;
            tracing::info!(seed_file = %seed, records = loaded, "Directory seeded");
        }

        Ok(Self::new(config.clone(), store))
    }
}
