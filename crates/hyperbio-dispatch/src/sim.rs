//! Simulated executor.
//!
//! Stands in for the real site pipelines: sleeps for a fixed duration
//! and succeeds.
// TODO: replace with executors that invoke the generate/refresh/deploy
// pipelines once those land.

use async_trait::async_trait;
use hyperbio_core::{JobExecutor, Result};
use std::time::Duration;
use tokio::time::sleep;

pub struct SimulatedExecutor {
    job_type: String,
    work: Duration,
}

impl SimulatedExecutor {
    pub fn new(job_type: impl Into<String>, work: Duration) -> Self {
        Self {
            job_type: job_type.into(),
            work,
        }
    }
}

#[async_trait]
impl JobExecutor for SimulatedExecutor {
    fn job_type(&self) -> &str {
        &self.job_type
    }

    async fn execute(&self, _payload: &serde_json::Value) -> Result<()> {
        sleep(self.work).await;
        Ok(())
    }
}
