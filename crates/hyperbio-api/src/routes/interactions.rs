//! Vote and comment endpoints.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use hyperbio_db::{CommentRecord, RecordedVote, VoteTally};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/votes", get(vote_counts).post(record_vote))
        .route("/comments", get(list_comments).post(create_comment))
}

#[derive(Debug, Deserialize)]
struct RecordVoteRequest {
    site_id: i64,
    entity_type: String,
    entity_key: String,
    choice: String,
    voter_id: Option<String>,
}

async fn record_vote(
    State(state): State<AppState>,
    Json(req): Json<RecordVoteRequest>,
) -> Result<Json<RecordedVote>, ApiError> {
    state.sites.get(req.site_id).await?;
    let recorded = state
        .interactions
        .record_vote(
            req.site_id,
            &req.entity_type,
            &req.entity_key,
            &req.choice,
            req.voter_id.as_deref(),
        )
        .await?;
    Ok(Json(recorded))
}

#[derive(Debug, Deserialize)]
struct EntityQuery {
    site_id: i64,
    entity_type: String,
    entity_key: String,
    limit: Option<i64>,
}

async fn vote_counts(
    State(state): State<AppState>,
    Query(query): Query<EntityQuery>,
) -> Result<Json<Vec<VoteTally>>, ApiError> {
    let tallies = state
        .interactions
        .vote_counts(query.site_id, &query.entity_type, &query.entity_key)
        .await?;
    Ok(Json(tallies))
}

#[derive(Debug, Deserialize)]
struct CreateCommentRequest {
    site_id: i64,
    entity_type: String,
    entity_key: String,
    author: Option<String>,
    body: String,
}

#[derive(Debug, Serialize)]
struct CommentResponse {
    id: i64,
    site_id: i64,
    entity_type: String,
    entity_key: String,
    author: Option<String>,
    body: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRecord> for CommentResponse {
    fn from(c: CommentRecord) -> Self {
        Self {
            id: c.id,
            site_id: c.site_id,
            entity_type: c.entity_type,
            entity_key: c.entity_key,
            author: c.author,
            body: c.body,
            created_at: c.created_at,
        }
    }
}

async fn create_comment(
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    state.sites.get(req.site_id).await?;
    let comment = state
        .interactions
        .create_comment(
            req.site_id,
            &req.entity_type,
            &req.entity_key,
            req.author.as_deref(),
            &req.body,
        )
        .await?;
    Ok(Json(comment.into()))
}

async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<EntityQuery>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let comments = state
        .interactions
        .list_comments(
            query.site_id,
            &query.entity_type,
            &query.entity_key,
            query.limit.unwrap_or(50),
        )
        .await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}
