//! Site registry endpoints.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use hyperbio_db::SiteRecord;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sites", get(list_sites).post(create_site))
        .route("/sites/{id}/hostnames", post(add_hostname))
        .route("/resolve", get(resolve_hostname))
}

#[derive(Debug, Deserialize)]
struct CreateSiteRequest {
    site_key: String,
    display_name: Option<String>,
    primary_domain: Option<String>,
}

#[derive(Debug, Serialize)]
struct SiteResponse {
    id: i64,
    site_key: String,
    display_name: Option<String>,
    primary_domain: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SiteRecord> for SiteResponse {
    fn from(s: SiteRecord) -> Self {
        Self {
            id: s.id,
            site_key: s.site_key,
            display_name: s.display_name,
            primary_domain: s.primary_domain,
            created_at: s.created_at,
        }
    }
}

async fn create_site(
    State(state): State<AppState>,
    Json(req): Json<CreateSiteRequest>,
) -> Result<Json<SiteResponse>, ApiError> {
    let site = state
        .sites
        .create(
            &req.site_key,
            req.display_name.as_deref(),
            req.primary_domain.as_deref(),
        )
        .await?;
    Ok(Json(site.into()))
}

async fn list_sites(
    State(state): State<AppState>,
) -> Result<Json<Vec<SiteResponse>>, ApiError> {
    let sites = state.sites.list().await?;
    Ok(Json(sites.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
struct AddHostnameRequest {
    hostname: String,
}

#[derive(Debug, Serialize)]
struct HostnameResponse {
    id: i64,
    hostname: String,
    site_id: i64,
}

async fn add_hostname(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AddHostnameRequest>,
) -> Result<Json<HostnameResponse>, ApiError> {
    // Reject unknown sites with a 404 rather than a foreign key error.
    state.sites.get(id).await?;
    let record = state.sites.add_hostname(id, &req.hostname).await?;
    Ok(Json(HostnameResponse {
        id: record.id,
        hostname: record.hostname,
        site_id: record.site_id,
    }))
}

#[derive(Debug, Deserialize)]
struct ResolveQuery {
    hostname: String,
}

async fn resolve_hostname(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<SiteResponse>, ApiError> {
    let site = state.sites.resolve_hostname(&query.hostname).await?;
    Ok(Json(site.into()))
}
