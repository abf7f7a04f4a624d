//! Vote and comment interactions.
//!
//! Vote inserts are idempotent under the natural key
//! (site, entity_type, entity_key, choice, voter): a duplicate insert is
//! a no-op success, expressed as ON CONFLICT DO NOTHING rather than by
//! catching a uniqueness violation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{DbError, DbResult};

/// Outcome of recording a vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedVote {
    /// Id of the stored vote; None when the insert was a duplicate no-op.
    pub vote_id: Option<i64>,
    pub created: bool,
}

/// Vote count for one choice.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VoteTally {
    pub choice: String,
    pub count: i64,
}

/// A comment record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: i64,
    pub site_id: i64,
    pub entity_type: String,
    pub entity_key: String,
    pub author: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// PostgreSQL interaction store.
pub struct PgInteractionStore {
    pool: PgPool,
}

impl PgInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record_vote(
        &self,
        site_id: i64,
        entity_type: &str,
        entity_key: &str,
        choice: &str,
        voter_id: Option<&str>,
    ) -> DbResult<RecordedVote> {
        for (name, value) in [
            ("entity_type", entity_type),
            ("entity_key", entity_key),
            ("choice", choice),
        ] {
            if value.trim().is_empty() {
                return Err(DbError::InvalidInput(format!("{name} must not be empty")));
            }
        }

        let vote_id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO votes (site_id, entity_type, entity_key, choice, voter_id, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT ON CONSTRAINT uq_vote_site_entity_choice_voter DO NOTHING
            RETURNING id
            "#,
        )
        .bind(site_id)
        .bind(entity_type.trim())
        .bind(entity_key.trim())
        .bind(choice.trim())
        .bind(voter_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(RecordedVote {
            created: vote_id.is_some(),
            vote_id,
        })
    }

    /// Tally votes by choice for one entity.
    pub async fn vote_counts(
        &self,
        site_id: i64,
        entity_type: &str,
        entity_key: &str,
    ) -> DbResult<Vec<VoteTally>> {
        let tallies = sqlx::query_as::<_, VoteTally>(
            r#"
            SELECT choice, COUNT(*) AS count FROM votes
            WHERE site_id = $1 AND entity_type = $2 AND entity_key = $3
            GROUP BY choice
            ORDER BY count DESC, choice
            "#,
        )
        .bind(site_id)
        .bind(entity_type)
        .bind(entity_key)
        .fetch_all(&self.pool)
        .await?;
        Ok(tallies)
    }

    pub async fn create_comment(
        &self,
        site_id: i64,
        entity_type: &str,
        entity_key: &str,
        author: Option<&str>,
        body: &str,
    ) -> DbResult<CommentRecord> {
        if body.trim().is_empty() {
            return Err(DbError::InvalidInput("body must not be empty".into()));
        }

        let record = sqlx::query_as::<_, CommentRecord>(
            r#"
            INSERT INTO comments (site_id, entity_type, entity_key, author, body, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING *
            "#,
        )
        .bind(site_id)
        .bind(entity_type.trim())
        .bind(entity_key.trim())
        .bind(author)
        .bind(body.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn list_comments(
        &self,
        site_id: i64,
        entity_type: &str,
        entity_key: &str,
        limit: i64,
    ) -> DbResult<Vec<CommentRecord>> {
        let limit = limit.clamp(1, 200);
        let records = sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT * FROM comments
            WHERE site_id = $1 AND entity_type = $2 AND entity_key = $3
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(site_id)
        .bind(entity_type)
        .bind(entity_key)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}
