//! Scheduler trigger endpoints.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new().route("/enqueue-nightly", post(enqueue_nightly))
}

#[derive(Debug, Serialize)]
struct EnqueueNightlyResponse {
    enqueued: usize,
    job_ids: Vec<i64>,
}

/// Enqueue one nightly_refresh job per registered site.
///
/// With an empty registry this degenerates to a single all-sites
/// placeholder job, so a fresh deployment still exercises the worker.
async fn enqueue_nightly(
    State(state): State<AppState>,
) -> Result<Json<EnqueueNightlyResponse>, ApiError> {
    let sites = state.sites.list().await?;

    let mut job_ids = Vec::new();
    if sites.is_empty() {
        let job = state
            .jobs
            .create("nightly_refresh", serde_json::json!({ "scope": "all" }))
            .await?;
        job_ids.push(job.id);
    } else {
        for site in &sites {
            let job = state
                .jobs
                .create(
                    "nightly_refresh",
                    serde_json::json!({ "site_key": site.site_key }),
                )
                .await?;
            job_ids.push(job.id);
        }
    }

    tracing::info!(enqueued = job_ids.len(), "Enqueued nightly refresh batch");
    Ok(Json(EnqueueNightlyResponse {
        enqueued: job_ids.len(),
        job_ids,
    }))
}
