//! Worker tick and queue status endpoints.
//!
//! Ticks are driven by external triggers (cron, CLI, scaled workers);
//! each call processes at most one job.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use hyperbio_db::QueueStats;
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tick", post(tick))
        .route("/status", get(status))
}

#[derive(Debug, Serialize)]
struct TickResponse {
    processed: bool,
}

async fn tick(State(state): State<AppState>) -> Result<Json<TickResponse>, ApiError> {
    let processed = state.dispatcher.tick().await?;
    Ok(Json(TickResponse { processed }))
}

async fn status(State(state): State<AppState>) -> Result<Json<QueueStats>, ApiError> {
    let stats = state.jobs.counts_by_status().await?;
    Ok(Json(stats))
}
