//! Server configuration from the environment.

use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    /// Visibility timeout for claimed jobs; a `running` job past this is
    /// presumed abandoned and becomes reclaimable.
    pub lease: Duration,
    /// Duration of the simulated work performed per job.
    pub sim_work: Duration,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// `HYPERBIO_DATABASE_URL` takes precedence over `DATABASE_URL`,
    /// matching the deployment's shared-database setup.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("HYPERBIO_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map_err(|_| {
                anyhow::anyhow!("missing HYPERBIO_DATABASE_URL (or DATABASE_URL)")
            })?;

        let listen_addr = std::env::var("HYPERBIO_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let lease_secs: u64 = std::env::var("HYPERBIO_LEASE_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()?;

        let sim_work_ms: u64 = std::env::var("HYPERBIO_SIM_WORK_MS")
            .unwrap_or_else(|_| "200".to_string())
            .parse()?;

        Ok(Self {
            database_url,
            listen_addr,
            lease: Duration::from_secs(lease_secs),
            sim_work: Duration::from_millis(sim_work_ms),
        })
    }
}
