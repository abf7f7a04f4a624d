//! Job lifecycle state machine.
//!
//! Status only ever moves forward: `queued -> running -> success | failed`.
//! Terminal states absorb; there is no regression and no cancellation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Success,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }

    /// Whether the forward-only state machine permits `self -> next`.
    ///
    /// `Running -> Running` is allowed: a lease-expired job is re-claimed
    /// without regressing through `Queued`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Queued, JobStatus::Running) => true,
            (JobStatus::Running, JobStatus::Running) => true,
            (JobStatus::Running, JobStatus::Success) => true,
            (JobStatus::Running, JobStatus::Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "success" => Ok(JobStatus::Success),
            "failed" => Ok(JobStatus::Failed),
            other => Err(Error::InvalidInput(format!("unknown job status: {other}"))),
        }
    }
}

/// Terminal outcome recorded by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Success,
    Failed,
}

impl JobOutcome {
    pub fn as_status(&self) -> JobStatus {
        match self {
            JobOutcome::Success => JobStatus::Success,
            JobOutcome::Failed => JobStatus::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for s in ["queued", "running", "success", "failed"] {
            let status: JobStatus = s.parse().unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert!("cancelled".parse::<JobStatus>().is_err());
    }

    #[test]
    fn transitions_are_forward_only() {
        use JobStatus::*;

        assert!(Queued.can_transition_to(Running));
        assert!(Running.can_transition_to(Success));
        assert!(Running.can_transition_to(Failed));
        assert!(Running.can_transition_to(Running));

        // No regression, no skipping the running state.
        assert!(!Queued.can_transition_to(Success));
        assert!(!Queued.can_transition_to(Failed));
        assert!(!Running.can_transition_to(Queued));

        // Terminal states absorb.
        for terminal in [Success, Failed] {
            for next in [Queued, Running, Success, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn terminal_states() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Success.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert_eq!(JobOutcome::Success.as_status(), JobStatus::Success);
        assert_eq!(JobOutcome::Failed.as_status(), JobStatus::Failed);
    }
}
