//! Postgres-backed content store.
//!
//! Schema expectations:
//!
//! ```sql
//! CREATE TABLE content_record (
//!     id UUID PRIMARY KEY,
//!     kind TEXT NOT NULL,
//!     parent_id UUID REFERENCES content_record(id) ON DELETE CASCADE,
//!     order_key INTEGER NOT NULL DEFAULT 0,
//!     title TEXT NOT NULL DEFAULT '',
//!     body TEXT NOT NULL DEFAULT '',
//!     format TEXT NOT NULL DEFAULT 'filtered_html',
//!     created BIGINT NOT NULL,
//!     changed BIGINT NOT NULL
//! );
//! CREATE TABLE content_metadata (
//!     record_id UUID NOT NULL REFERENCES content_record(id) ON DELETE CASCADE,
//!     key TEXT NOT NULL,
//!     value TEXT NOT NULL,
//!     PRIMARY KEY (record_id, key)
//! );
//! ```

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ContentRecord, CreateRecord, RecordKind, UpdateRecord};

use super::ContentStore;

/// Postgres content store.
pub struct PgStore {
    pool: PgPool,
}

/// Row shape for `content_record`; `kind` is stored as text.
#[derive(sqlx::FromRow)]
struct RecordRow {
    id: Uuid,
    kind: String,
    parent_id: Option<Uuid>,
    order_key: i32,
    title: String,
    body: String,
    format: String,
    created: i64,
    changed: i64,
}

impl TryFrom<RecordRow> for ContentRecord {
    type Error = anyhow::Error;

    fn try_from(row: RecordRow) -> Result<Self> {
        let kind = RecordKind::parse(&row.kind)
            .with_context(|| format!("unknown record kind in storage: {}", row.kind))?;
        Ok(ContentRecord {
            id: row.id,
            kind,
            parent_id: row.parent_id,
            order_key: row.order_key,
            title: row.title,
            body: row.body,
            format: row.format,
            created: row.created,
            changed: row.changed,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, kind, parent_id, order_key, title, body, format, created, changed";

impl PgStore {
    /// Connect to the given database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("failed to connect to Postgres")?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn create(&self, input: CreateRecord) -> Result<ContentRecord> {
        let record = ContentRecord::from_input(input);
        sqlx::query(
            "INSERT INTO content_record (id, kind, parent_id, order_key, title, body, format, created, changed) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(record.id)
        .bind(record.kind.as_str())
        .bind(record.parent_id)
        .bind(record.order_key)
        .bind(&record.title)
        .bind(&record.body)
        .bind(&record.format)
        .bind(record.created)
        .bind(record.changed)
        .execute(&self.pool)
        .await
        .context("failed to insert content record")?;

        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ContentRecord>> {
        let row = sqlx::query_as::<_, RecordRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM content_record WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch content record")?;

        row.map(ContentRecord::try_from).transpose()
    }

    async fn update(&self, id: Uuid, input: UpdateRecord) -> Result<Option<ContentRecord>> {
        let now = chrono::Utc::now().timestamp();
        let row = sqlx::query_as::<_, RecordRow>(&format!(
            "UPDATE content_record SET \
                 title = COALESCE($2, title), \
                 body = COALESCE($3, body), \
                 format = COALESCE($4, format), \
                 changed = $5 \
             WHERE id = $1 RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(input.title)
        .bind(input.body)
        .bind(input.format)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .context("failed to update content record")?;

        row.map(ContentRecord::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        // Metadata rows go with the record via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM content_record WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete content record")?;
        Ok(result.rows_affected() > 0)
    }

    async fn children(&self, parent_id: Uuid, limit: usize) -> Result<Vec<ContentRecord>> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM content_record \
             WHERE parent_id = $1 ORDER BY order_key ASC, created ASC LIMIT $2"
        ))
        .bind(parent_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch children")?;

        rows.into_iter().map(ContentRecord::try_from).collect()
    }

    async fn set_order_keys(&self, keys: &[(Uuid, i32)]) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin reorder transaction")?;

        for (id, key) in keys {
            let result =
                sqlx::query("UPDATE content_record SET order_key = $2, changed = $3 WHERE id = $1")
                    .bind(id)
                    .bind(key)
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .context("failed to update order key")?;
            if result.rows_affected() == 0 {
                anyhow::bail!("cannot set order key on missing record {id}");
            }
        }

        tx.commit().await.context("failed to commit reorder")?;
        Ok(())
    }

    async fn metadata(&self, id: Uuid) -> Result<HashMap<String, String>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM content_metadata WHERE record_id = $1")
                .bind(id)
                .fetch_all(&self.pool)
                .await
                .context("failed to fetch metadata")?;
        Ok(rows.into_iter().collect())
    }

    async fn set_metadata(&self, id: Uuid, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO content_metadata (record_id, key, value) VALUES ($1, $2, $3) \
             ON CONFLICT (record_id, key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .context("failed to set metadata")?;
        Ok(())
    }

    async fn remove_metadata(&self, id: Uuid, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM content_metadata WHERE record_id = $1 AND key = $2")
            .bind(id)
            .bind(key)
            .execute(&self.pool)
            .await
            .context("failed to remove metadata")?;
        Ok(())
    }
}
