//! API routes.

pub mod health;
pub mod interactions;
pub mod jobs;
pub mod scheduler;
pub mod sites;
pub mod worker;

use crate::AppState;
use axum::Router;

/// Build the main API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_router())
        .merge(health::router())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/jobs", jobs::router())
        .nest("/worker", worker::router())
        .nest("/scheduler", scheduler::router())
        .merge(sites::router())
        .merge(interactions::router())
}
