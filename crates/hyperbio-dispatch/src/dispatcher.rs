//! The dispatch cycle.

use hyperbio_core::JobOutcome;
use hyperbio_db::{DbResult, JobStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::registry::ExecutorRegistry;

/// last_error recorded for jobs whose job_type has no registered executor.
pub const UNKNOWN_JOB_TYPE: &str = "unknown job_type";

/// Claims jobs from the store and runs them through registered executors.
///
/// Holds its dependencies explicitly; there is no ambient store instance.
/// Multiple dispatchers (or concurrent ticks on one) may share a store:
/// the store's atomic claim guarantees each job is handed out once.
pub struct Dispatcher {
    store: Arc<dyn JobStore>,
    registry: ExecutorRegistry,
    lease: Duration,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn JobStore>, registry: ExecutorRegistry, lease: Duration) -> Self {
        Self {
            store,
            registry,
            lease,
        }
    }

    /// Run one dispatch cycle: claim at most one job, execute it, record
    /// the terminal outcome. Returns whether a job was processed.
    ///
    /// Executor failures land in the job's `last_error`; only storage
    /// failures surface as errors here.
    pub async fn tick(&self) -> DbResult<bool> {
        let Some(job) = self.store.claim_next(self.lease).await? else {
            return Ok(false);
        };
        let id = job.job_id();
        info!(job_id = %id, job_type = %job.job_type, "Claimed job");

        let Some(executor) = self.registry.get(&job.job_type) else {
            warn!(job_id = %id, job_type = %job.job_type, "No executor registered");
            self.store
                .mark_terminal(id, JobOutcome::Failed, Some(UNKNOWN_JOB_TYPE))
                .await?;
            return Ok(true);
        };

        match executor.execute(&job.payload).await {
            Ok(()) => {
                info!(job_id = %id, "Job succeeded");
                self.store.mark_terminal(id, JobOutcome::Success, None).await?;
            }
            Err(e) => {
                warn!(job_id = %id, error = %e, "Job failed");
                self.store
                    .mark_terminal(id, JobOutcome::Failed, Some(&e.to_string()))
                    .await?;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedExecutor;
    use async_trait::async_trait;
    use chrono::Utc;
    use hyperbio_core::{Error, JobExecutor, JobId, JobStatus};
    use hyperbio_db::{DbError, JobRecord, QueueStats};
    use std::sync::Mutex;

    /// In-memory job store with the same claim/transition contract as
    /// the Postgres implementation.
    #[derive(Default)]
    struct MemoryJobStore {
        inner: Mutex<MemoryInner>,
    }

    #[derive(Default)]
    struct MemoryInner {
        next_id: i64,
        jobs: Vec<JobRecord>,
    }

    impl MemoryJobStore {
        fn snapshot(&self, id: JobId) -> JobRecord {
            self.inner
                .lock()
                .unwrap()
                .jobs
                .iter()
                .find(|j| j.id == id.as_i64())
                .cloned()
                .unwrap()
        }
    }

    #[async_trait]
    impl JobStore for MemoryJobStore {
        async fn create(
            &self,
            job_type: &str,
            payload: serde_json::Value,
        ) -> DbResult<JobRecord> {
            let job_type = job_type.trim();
            if job_type.is_empty() {
                return Err(DbError::InvalidInput("job_type must not be empty".into()));
            }
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let record = JobRecord {
                id: inner.next_id,
                job_type: job_type.to_string(),
                status: JobStatus::Queued.as_str().to_string(),
                payload,
                last_error: None,
                created_at: Utc::now(),
                started_at: None,
                finished_at: None,
                lease_expires_at: None,
            };
            inner.jobs.push(record.clone());
            Ok(record)
        }

        async fn get(&self, id: JobId) -> DbResult<JobRecord> {
            self.inner
                .lock()
                .unwrap()
                .jobs
                .iter()
                .find(|j| j.id == id.as_i64())
                .cloned()
                .ok_or_else(|| DbError::NotFound(format!("job {}", id)))
        }

        async fn list(
            &self,
            status: Option<JobStatus>,
            limit: i64,
        ) -> DbResult<Vec<JobRecord>> {
            let limit = limit.clamp(1, 200) as usize;
            let inner = self.inner.lock().unwrap();
            let mut records: Vec<JobRecord> = inner
                .jobs
                .iter()
                .filter(|j| status.is_none_or(|s| j.status == s.as_str()))
                .cloned()
                .collect();
            records.sort_by(|a, b| b.id.cmp(&a.id));
            records.truncate(limit);
            Ok(records)
        }

        async fn claim_next(&self, lease: Duration) -> DbResult<Option<JobRecord>> {
            let now = Utc::now();
            let mut inner = self.inner.lock().unwrap();
            let eligible = |j: &&mut JobRecord| {
                j.status == "queued"
                    || (j.status == "running"
                        && j.lease_expires_at.is_some_and(|t| t <= now))
            };
            let Some(job) = inner.jobs.iter_mut().filter(eligible).min_by_key(|j| j.id)
            else {
                return Ok(None);
            };
            job.status = JobStatus::Running.as_str().to_string();
            job.started_at.get_or_insert(now);
            job.lease_expires_at =
                Some(now + chrono::Duration::from_std(lease).unwrap());
            Ok(Some(job.clone()))
        }

        async fn mark_terminal(
            &self,
            id: JobId,
            outcome: JobOutcome,
            error: Option<&str>,
        ) -> DbResult<JobRecord> {
            let mut inner = self.inner.lock().unwrap();
            let Some(job) = inner.jobs.iter_mut().find(|j| j.id == id.as_i64()) else {
                return Err(DbError::NotFound(format!("job {}", id)));
            };
            if job.status != "running" {
                return Err(DbError::InvalidTransition(format!(
                    "job {} is {}, expected running",
                    id, job.status
                )));
            }
            job.status = outcome.as_status().as_str().to_string();
            job.finished_at = Some(Utc::now());
            job.last_error = error.map(String::from);
            job.lease_expires_at = None;
            Ok(job.clone())
        }

        async fn counts_by_status(&self) -> DbResult<QueueStats> {
            let inner = self.inner.lock().unwrap();
            let mut stats = QueueStats::default();
            for job in &inner.jobs {
                match job.status.as_str() {
                    "queued" => stats.queued += 1,
                    "running" => stats.running += 1,
                    "success" => stats.success += 1,
                    "failed" => stats.failed += 1,
                    _ => {}
                }
            }
            Ok(stats)
        }
    }

    struct FailingExecutor;

    #[async_trait]
    impl JobExecutor for FailingExecutor {
        fn job_type(&self) -> &str {
            "always_fails"
        }

        async fn execute(&self, _payload: &serde_json::Value) -> hyperbio_core::Result<()> {
            Err(Error::ExecutionFailed("simulated pipeline failure".into()))
        }
    }

    fn dispatcher_with(
        store: Arc<MemoryJobStore>,
        lease: Duration,
    ) -> Dispatcher {
        let mut registry = ExecutorRegistry::new();
        registry.register(Arc::new(SimulatedExecutor::new(
            "nightly_refresh",
            Duration::from_millis(5),
        )));
        registry.register(Arc::new(FailingExecutor));
        Dispatcher::new(store, registry, lease)
    }

    #[tokio::test]
    async fn tick_with_empty_queue_does_nothing() {
        let store = Arc::new(MemoryJobStore::default());
        let dispatcher = dispatcher_with(store, Duration::from_secs(300));
        assert!(!dispatcher.tick().await.unwrap());
    }

    #[tokio::test]
    async fn tick_runs_one_job_to_success() {
        let store = Arc::new(MemoryJobStore::default());
        let job = store
            .create("nightly_refresh", serde_json::json!({}))
            .await
            .unwrap();
        let dispatcher = dispatcher_with(store.clone(), Duration::from_secs(300));

        assert!(dispatcher.tick().await.unwrap());

        let done = store.snapshot(job.job_id());
        assert_eq!(done.status, "success");
        assert!(done.last_error.is_none());
        assert!(done.started_at.unwrap() >= done.created_at);
        assert!(done.finished_at.unwrap() >= done.started_at.unwrap());
    }

    #[tokio::test]
    async fn unknown_job_type_fails_the_job() {
        let store = Arc::new(MemoryJobStore::default());
        let job = store
            .create("unregistered_type", serde_json::json!({}))
            .await
            .unwrap();
        let dispatcher = dispatcher_with(store.clone(), Duration::from_secs(300));

        assert!(dispatcher.tick().await.unwrap());

        let done = store.snapshot(job.job_id());
        assert_eq!(done.status, "failed");
        assert_eq!(done.last_error.as_deref(), Some(UNKNOWN_JOB_TYPE));
    }

    #[tokio::test]
    async fn executor_error_is_captured_into_last_error() {
        let store = Arc::new(MemoryJobStore::default());
        store
            .create("always_fails", serde_json::json!({"site_key": "bio-bob-dylan"}))
            .await
            .unwrap();
        let dispatcher = dispatcher_with(store.clone(), Duration::from_secs(300));

        assert!(dispatcher.tick().await.unwrap());

        let failed = store.list(Some(JobStatus::Failed), 10).await.unwrap();
        assert_eq!(failed.len(), 1);
        assert!(
            failed
                .iter()
                .all(|j| j.last_error.as_deref().is_some_and(|e| !e.is_empty()))
        );
    }

    #[tokio::test]
    async fn concurrent_ticks_claim_each_job_exactly_once() {
        let store = Arc::new(MemoryJobStore::default());
        store
            .create("nightly_refresh", serde_json::json!({}))
            .await
            .unwrap();
        let dispatcher = Arc::new(dispatcher_with(store.clone(), Duration::from_secs(300)));

        let (a, b) = tokio::join!(
            {
                let d = dispatcher.clone();
                async move { d.tick().await.unwrap() }
            },
            {
                let d = dispatcher.clone();
                async move { d.tick().await.unwrap() }
            }
        );

        // Exactly one tick processed the single queued job.
        assert!(a ^ b);
        let stats = store.counts_by_status().await.unwrap();
        assert_eq!(stats.success, 1);
        assert_eq!(stats.queued, 0);
        assert_eq!(stats.running, 0);
    }

    #[tokio::test]
    async fn many_queued_jobs_each_processed_once() {
        let store = Arc::new(MemoryJobStore::default());
        for _ in 0..8 {
            store
                .create("nightly_refresh", serde_json::json!({}))
                .await
                .unwrap();
        }
        let dispatcher = Arc::new(dispatcher_with(store.clone(), Duration::from_secs(300)));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let d = dispatcher.clone();
            handles.push(tokio::spawn(async move {
                let mut processed = 0;
                while d.tick().await.unwrap() {
                    processed += 1;
                }
                processed
            }));
        }
        let mut total = 0;
        for h in handles {
            total += h.await.unwrap();
        }

        assert_eq!(total, 8);
        let stats = store.counts_by_status().await.unwrap();
        assert_eq!(stats.success, 8);
    }

    #[tokio::test]
    async fn expired_lease_makes_job_reclaimable() {
        let store = Arc::new(MemoryJobStore::default());
        let job = store
            .create("nightly_refresh", serde_json::json!({}))
            .await
            .unwrap();

        // Claim with an already-expired lease, simulating a dispatcher
        // that crashed between claim and terminal.
        let abandoned = store.claim_next(Duration::ZERO).await.unwrap().unwrap();
        assert_eq!(abandoned.id, job.id);
        let first_start = abandoned.started_at.unwrap();

        let dispatcher = dispatcher_with(store.clone(), Duration::from_secs(300));
        assert!(dispatcher.tick().await.unwrap());

        let done = store.snapshot(job.job_id());
        assert_eq!(done.status, "success");
        // Re-claim preserves the original started_at.
        assert_eq!(done.started_at.unwrap(), first_start);
    }

    #[tokio::test]
    async fn unexpired_lease_is_not_reclaimed() {
        let store = Arc::new(MemoryJobStore::default());
        store
            .create("nightly_refresh", serde_json::json!({}))
            .await
            .unwrap();

        let claimed = store.claim_next(Duration::from_secs(300)).await.unwrap();
        assert!(claimed.is_some());

        let dispatcher = dispatcher_with(store.clone(), Duration::from_secs(300));
        assert!(!dispatcher.tick().await.unwrap());
    }

    #[tokio::test]
    async fn mark_terminal_off_running_is_rejected_without_mutation() {
        let store = Arc::new(MemoryJobStore::default());
        let job = store
            .create("nightly_refresh", serde_json::json!({}))
            .await
            .unwrap();

        let err = store
            .mark_terminal(job.job_id(), JobOutcome::Success, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidTransition(_)));
        assert_eq!(store.snapshot(job.job_id()).status, "queued");

        let err = store
            .mark_terminal(JobId::from_i64(999), JobOutcome::Failed, Some("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }
}
