//! Job store: durable persistence for the job queue.
//!
//! Uses single-statement conditional updates with SKIP LOCKED so that
//! concurrent dispatchers never claim the same job and a failed write
//! never leaves a half-applied transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyperbio_core::{JobId, JobOutcome, JobStatus};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::time::Duration;

use crate::{DbError, DbResult};

/// List limits are clamped to this range.
pub const MIN_LIST_LIMIT: i64 = 1;
pub const MAX_LIST_LIMIT: i64 = 200;

/// A job record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobRecord {
    pub id: i64,
    pub job_type: String,
    pub status: String,
    pub payload: serde_json::Value,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub lease_expires_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn job_id(&self) -> JobId {
        JobId::from_i64(self.id)
    }
}

/// Per-status queue depths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStats {
    pub queued: i64,
    pub running: i64,
    pub success: i64,
    pub failed: i64,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job with status `queued`.
    async fn create(&self, job_type: &str, payload: serde_json::Value) -> DbResult<JobRecord>;

    async fn get(&self, id: JobId) -> DbResult<JobRecord>;

    /// List jobs newest-first, optionally filtered by status.
    /// `limit` is clamped to 1..=200.
    async fn list(&self, status: Option<JobStatus>, limit: i64) -> DbResult<Vec<JobRecord>>;

    /// Atomically claim the oldest eligible job and transition it to
    /// `running` with a lease of `lease` from now.
    ///
    /// Eligible: `queued`, or `running` with an expired lease (presumed
    /// abandoned by a crashed dispatcher). Concurrent callers never
    /// receive the same job.
    async fn claim_next(&self, lease: Duration) -> DbResult<Option<JobRecord>>;

    /// Transition a `running` job to a terminal outcome, stamping
    /// `finished_at` and recording `error` as `last_error`.
    ///
    /// Fails with `InvalidTransition` (leaving the row untouched) if the
    /// job is not currently `running`.
    async fn mark_terminal(
        &self,
        id: JobId,
        outcome: JobOutcome,
        error: Option<&str>,
    ) -> DbResult<JobRecord>;

    async fn counts_by_status(&self) -> DbResult<QueueStats>;
}

/// PostgreSQL implementation of the job store.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, job_type: &str, payload: serde_json::Value) -> DbResult<JobRecord> {
        let job_type = job_type.trim();
        if job_type.is_empty() {
            return Err(DbError::InvalidInput("job_type must not be empty".into()));
        }

        let record = sqlx::query_as::<_, JobRecord>(
            r#"
            INSERT INTO jobs (job_type, status, payload, created_at)
            VALUES ($1, 'queued', $2, NOW())
            RETURNING *
            "#,
        )
        .bind(job_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn get(&self, id: JobId) -> DbResult<JobRecord> {
        let record = sqlx::query_as::<_, JobRecord>("SELECT * FROM jobs WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("job {}", id)))?;
        Ok(record)
    }

    async fn list(&self, status: Option<JobStatus>, limit: i64) -> DbResult<Vec<JobRecord>> {
        let limit = limit.clamp(MIN_LIST_LIMIT, MAX_LIST_LIMIT);
        let records = match status {
            Some(status) => {
                sqlx::query_as::<_, JobRecord>(
                    "SELECT * FROM jobs WHERE status = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
                )
                .bind(status.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, JobRecord>(
                    "SELECT * FROM jobs ORDER BY created_at DESC, id DESC LIMIT $1",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(records)
    }

    async fn claim_next(&self, lease: Duration) -> DbResult<Option<JobRecord>> {
        // COALESCE keeps the original started_at when a lease-expired job
        // is re-claimed.
        let record = sqlx::query_as::<_, JobRecord>(
            r#"
            UPDATE jobs
            SET status = 'running',
                started_at = COALESCE(started_at, NOW()),
                lease_expires_at = NOW() + make_interval(secs => $1)
            WHERE id = (
                SELECT id FROM jobs
                WHERE status = 'queued'
                   OR (status = 'running' AND lease_expires_at <= NOW())
                ORDER BY created_at ASC, id ASC
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            RETURNING *
            "#,
        )
        .bind(lease.as_secs_f64())
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn mark_terminal(
        &self,
        id: JobId,
        outcome: JobOutcome,
        error: Option<&str>,
    ) -> DbResult<JobRecord> {
        let record = sqlx::query_as::<_, JobRecord>(
            r#"
            UPDATE jobs
            SET status = $2,
                finished_at = NOW(),
                last_error = $3,
                lease_expires_at = NULL
            WHERE id = $1 AND status = 'running'
            RETURNING *
            "#,
        )
        .bind(id.as_i64())
        .bind(outcome.as_status().as_str())
        .bind(error)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) => Ok(record),
            // Zero rows matched: distinguish a missing job from one that
            // is not in `running`. Either way the stored row is untouched.
            None => {
                let current = self.get(id).await?;
                Err(DbError::InvalidTransition(format!(
                    "job {} is {}, expected running",
                    id, current.status
                )))
            }
        }
    }

    async fn counts_by_status(&self) -> DbResult<QueueStats> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM jobs GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut stats = QueueStats::default();
        for (status, count) in rows {
            match status.as_str() {
                "queued" => stats.queued = count,
                "running" => stats.running = count,
                "success" => stats.success = count,
                "failed" => stats.failed = count,
                other => tracing::warn!(status = %other, "Unknown job status in store"),
            }
        }
        Ok(stats)
    }
}
