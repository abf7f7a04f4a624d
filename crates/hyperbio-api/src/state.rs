//! Application state.
//!
//! All handlers receive their stores and the dispatcher through this
//! state; nothing reaches for a global instance.

use hyperbio_db::{JobStore, PgInteractionStore, PgJobStore, PgSiteStore};
use hyperbio_dispatch::{Dispatcher, ExecutorRegistry, SimulatedExecutor};
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;

/// Job types currently backed by the simulated executor.
const SIMULATED_JOB_TYPES: &[&str] = &[
    "nightly_refresh",
    "generate_site",
    "refresh_media",
    "deploy_domain",
];

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jobs: Arc<dyn JobStore>,
    pub sites: Arc<PgSiteStore>,
    pub interactions: Arc<PgInteractionStore>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        let jobs: Arc<dyn JobStore> = Arc::new(PgJobStore::new(pool.clone()));
        let sites = Arc::new(PgSiteStore::new(pool.clone()));
        let interactions = Arc::new(PgInteractionStore::new(pool.clone()));

        let mut registry = ExecutorRegistry::new();
        for job_type in SIMULATED_JOB_TYPES {
            registry.register(Arc::new(SimulatedExecutor::new(*job_type, config.sim_work)));
        }

        let dispatcher = Arc::new(Dispatcher::new(jobs.clone(), registry, config.lease));

        Self {
            pool,
            jobs,
            sites,
            interactions,
            dispatcher,
        }
    }
}
