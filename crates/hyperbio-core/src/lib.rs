//! Core domain types and traits for the hyperbio orchestrator.
//!
//! This crate contains:
//! - Job identifiers and the job status state machine
//! - Executor trait for job_type-keyed work functions
//! - Error taxonomy shared across layers

pub mod error;
pub mod executor;
pub mod id;
pub mod job;

pub use error::{Error, Result};
pub use executor::JobExecutor;
pub use id::JobId;
pub use job::{JobOutcome, JobStatus};
