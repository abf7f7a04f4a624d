//! Executor trait for job_type-keyed work functions.
//!
//! The dispatcher resolves a job's `job_type` against a registry of
//! executors; the payload is opaque to everything except the executor
//! that handles it.

use async_trait::async_trait;

use crate::Result;

/// A work function for one job type.
///
/// Implementations run to completion or error; there is no mid-flight
/// cancellation. A returned error fails the job and is captured into
/// its `last_error`.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// The job_type this executor handles.
    fn job_type(&self) -> &str;

    /// Execute the work described by `payload`.
    async fn execute(&self, payload: &serde_json::Value) -> Result<()>;
}
