//! ContentEntry model and CRUD operations.
//!
//! Entries hold an opaque JSON document under one content type. `status` is a
//! free-form string and `published_at` is stored as given; nothing here ties
//! the two together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::sort::{ListQuery, SortKey};
use crate::error::{AppError, AppResult, classify_db_error};

/// Status given to entries created without one.
pub const DEFAULT_STATUS: &str = "draft";

const COLUMNS: &str =
    "id, content_type_id, data, status, created_by, created_at, updated_at, published_at";

/// Content entry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    pub id: Uuid,
    pub content_type_id: Uuid,
    pub data: serde_json::Value,
    pub status: String,

    /// Acting user at creation time, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

/// Input for creating a content entry.
#[derive(Debug, Clone)]
pub struct CreateContentEntry {
    pub content_type_id: Uuid,
    pub data: serde_json::Value,
    /// Blank or missing becomes [`DEFAULT_STATUS`].
    pub status: Option<String>,
    pub created_by: Option<Uuid>,
}

impl CreateContentEntry {
    /// Status to store, after defaulting.
    pub fn effective_status(&self) -> &str {
        match self.status.as_deref().map(str::trim) {
            Some(status) if !status.is_empty() => status,
            _ => DEFAULT_STATUS,
        }
    }
}

/// Input for a partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateContentEntry {
    pub data: Option<serde_json::Value>,
    pub status: Option<String>,
}

/// Allow-listed ordering for entry listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentEntrySort {
    Id,
    #[default]
    CreatedAt,
    UpdatedAt,
    PublishedAt,
    Status,
}

impl SortKey for ContentEntrySort {
    fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("id") => ContentEntrySort::Id,
            Some("updated_at") => ContentEntrySort::UpdatedAt,
            Some("published_at") => ContentEntrySort::PublishedAt,
            Some("status") => ContentEntrySort::Status,
            _ => ContentEntrySort::CreatedAt,
        }
    }

    fn column(self) -> &'static str {
        match self {
            ContentEntrySort::Id => "id",
            ContentEntrySort::CreatedAt => "created_at",
            ContentEntrySort::UpdatedAt => "updated_at",
            ContentEntrySort::PublishedAt => "published_at",
            ContentEntrySort::Status => "status",
        }
    }
}

impl ContentEntry {
    /// Find an entry by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<Self>> {
        let entry = sqlx::query_as::<_, ContentEntry>(&format!(
            "SELECT {COLUMNS} FROM content_entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(entry)
    }

    /// List one page of entries belonging to a content type.
    pub async fn list_by_type(
        pool: &PgPool,
        content_type_id: Uuid,
        query: &ListQuery<ContentEntrySort>,
    ) -> AppResult<Vec<Self>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM content_entries WHERE content_type_id = $1 ORDER BY {} LIMIT $2 OFFSET $3",
            query.order_clause()
        );
        debug!(
            content_type_id = %content_type_id,
            order = %query.order_clause(),
            limit = query.limit,
            offset = query.offset,
            "listing content entries"
        );

        let entries = sqlx::query_as::<_, ContentEntry>(&sql)
            .bind(content_type_id)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(pool)
            .await?;

        Ok(entries)
    }

    /// Count entries belonging to a content type.
    pub async fn count_by_type(pool: &PgPool, content_type_id: Uuid) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM content_entries WHERE content_type_id = $1")
                .bind(content_type_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Create an entry.
    pub async fn create(pool: &PgPool, input: CreateContentEntry) -> AppResult<Self> {
        let id = Uuid::now_v7();

        let entry = sqlx::query_as::<_, ContentEntry>(&format!(
            r#"
            INSERT INTO content_entries (id, content_type_id, data, status, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.content_type_id)
        .bind(&input.data)
        .bind(input.effective_status())
        .bind(input.created_by)
        .fetch_one(pool)
        .await
        .map_err(|e| classify_db_error(e, "content entry"))?;

        Ok(entry)
    }

    /// Apply a partial update and refresh `updated_at`.
    pub async fn update(pool: &PgPool, id: Uuid, input: UpdateContentEntry) -> AppResult<Self> {
        let entry = sqlx::query_as::<_, ContentEntry>(&format!(
            r#"
            UPDATE content_entries SET
                data = COALESCE($2, data),
                status = COALESCE($3, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.data)
        .bind(&input.status)
        .fetch_optional(pool)
        .await
        .map_err(|e| classify_db_error(e, "content entry"))?;

        entry.ok_or_else(|| AppError::NotFound(format!("content entry {id}")))
    }

    /// Delete an entry.
    pub async fn delete(pool: &PgPool, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM content_entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("content entry {id}")));
        }

        Ok(())
    }
}
