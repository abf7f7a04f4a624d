//! Site registry.
//!
//! Canonical biography site identity. A doorway hostname and a hub
//! hostname can map to the same site via the hostnames table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{DbError, DbResult};

/// A site record in the database. Example site_key: "bio-bob-dylan".
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SiteRecord {
    pub id: i64,
    pub site_key: String,
    pub display_name: Option<String>,
    pub primary_domain: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A hostname-to-site mapping.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HostnameRecord {
    pub id: i64,
    pub hostname: String,
    pub site_id: i64,
    pub created_at: DateTime<Utc>,
}

/// PostgreSQL site registry.
pub struct PgSiteStore {
    pool: PgPool,
}

impl PgSiteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        site_key: &str,
        display_name: Option<&str>,
        primary_domain: Option<&str>,
    ) -> DbResult<SiteRecord> {
        let site_key = site_key.trim();
        if site_key.is_empty() {
            return Err(DbError::InvalidInput("site_key must not be empty".into()));
        }

        let record = sqlx::query_as::<_, SiteRecord>(
            r#"
            INSERT INTO sites (site_key, display_name, primary_domain, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING *
            "#,
        )
        .bind(site_key)
        .bind(display_name)
        .bind(primary_domain)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DbError::Duplicate(format!("site {}", site_key))
            }
            _ => DbError::Database(e),
        })?;
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> DbResult<SiteRecord> {
        let record = sqlx::query_as::<_, SiteRecord>("SELECT * FROM sites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("site {}", id)))?;
        Ok(record)
    }

    pub async fn list(&self) -> DbResult<Vec<SiteRecord>> {
        let records =
            sqlx::query_as::<_, SiteRecord>("SELECT * FROM sites ORDER BY site_key")
                .fetch_all(&self.pool)
                .await?;
        Ok(records)
    }

    pub async fn add_hostname(&self, site_id: i64, hostname: &str) -> DbResult<HostnameRecord> {
        let hostname = hostname.trim().to_ascii_lowercase();
        if hostname.is_empty() {
            return Err(DbError::InvalidInput("hostname must not be empty".into()));
        }

        let record = sqlx::query_as::<_, HostnameRecord>(
            r#"
            INSERT INTO hostnames (hostname, site_id, created_at)
            VALUES ($1, $2, NOW())
            RETURNING *
            "#,
        )
        .bind(&hostname)
        .bind(site_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DbError::Duplicate(format!("hostname {}", hostname))
            }
            _ => DbError::Database(e),
        })?;
        Ok(record)
    }

    /// Resolve a hostname to its canonical site.
    pub async fn resolve_hostname(&self, hostname: &str) -> DbResult<SiteRecord> {
        let hostname = hostname.trim().to_ascii_lowercase();
        let record = sqlx::query_as::<_, SiteRecord>(
            r#"
            SELECT s.* FROM sites s
            JOIN hostnames h ON h.site_id = s.id
            WHERE h.hostname = $1
            "#,
        )
        .bind(&hostname)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("hostname {}", hostname)))?;
        Ok(record)
    }
}
