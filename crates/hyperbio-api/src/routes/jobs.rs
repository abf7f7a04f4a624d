//! Job enqueue and inspection endpoints.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use hyperbio_core::{JobId, JobStatus};
use hyperbio_db::JobRecord;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs).post(enqueue_job))
        .route("/{id}", get(get_job))
}

#[derive(Debug, Deserialize)]
struct EnqueueJobRequest {
    /// e.g. generate_site, refresh_media, deploy_domain
    job_type: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct EnqueueJobResponse {
    job_id: i64,
}

async fn enqueue_job(
    State(state): State<AppState>,
    Json(req): Json<EnqueueJobRequest>,
) -> Result<Json<EnqueueJobResponse>, ApiError> {
    let payload = match req.payload {
        serde_json::Value::Null => serde_json::json!({}),
        other => other,
    };
    let job = state.jobs.create(&req.job_type, payload).await?;
    tracing::info!(job_id = %job.id, job_type = %job.job_type, "Enqueued job");
    Ok(Json(EnqueueJobResponse { job_id: job.id }))
}

#[derive(Debug, Serialize)]
struct JobResponse {
    id: i64,
    job_type: String,
    status: String,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl From<JobRecord> for JobResponse {
    fn from(j: JobRecord) -> Self {
        Self {
            id: j.id,
            job_type: j.job_type,
            status: j.status,
            payload: j.payload,
            created_at: j.created_at,
            started_at: j.started_at,
            finished_at: j.finished_at,
            last_error: j.last_error,
        }
    }
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state.jobs.get(JobId::from_i64(id)).await?;
    Ok(Json(job.into()))
}

#[derive(Debug, Deserialize)]
struct ListJobsQuery {
    status: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
struct JobSummary {
    id: i64,
    job_type: String,
    status: String,
    created_at: DateTime<Utc>,
}

async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Vec<JobSummary>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<JobStatus>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let jobs = state.jobs.list(status, query.limit.unwrap_or(50)).await?;
    let response: Vec<JobSummary> = jobs
        .into_iter()
        .map(|j| JobSummary {
            id: j.id,
            job_type: j.job_type,
            status: j.status,
            created_at: j.created_at,
        })
        .collect();
    Ok(Json(response))
}
