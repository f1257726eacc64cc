//! ContentType model and CRUD operations.
//!
//! A content type is a named, slugged schema under which entries are grouped.
//! The schema is stored as opaque JSONB; only syntactic validity is checked,
//! and that happens before a value of this module is ever built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::sort::{ListQuery, SortKey};
use crate::error::{AppError, AppResult, classify_db_error};

const COLUMNS: &str = "id, name, slug, description, schema, created_at, updated_at";

/// Content type record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    pub id: Uuid,

    /// Human-readable name, unique.
    pub name: String,

    /// External routing key, unique.
    pub slug: String,

    pub description: String,

    /// Opaque schema document.
    pub schema: serde_json::Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a content type.
#[derive(Debug, Clone)]
pub struct CreateContentType {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub schema: serde_json::Value,
}

/// Input for a partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateContentType {
    pub name: Option<String>,
    pub description: Option<String>,
    pub schema: Option<serde_json::Value>,
}

/// Allow-listed ordering for content type listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentTypeSort {
    Id,
    Name,
    Slug,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortKey for ContentTypeSort {
    fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("id") => ContentTypeSort::Id,
            Some("name") => ContentTypeSort::Name,
            Some("slug") => ContentTypeSort::Slug,
            Some("updated_at") => ContentTypeSort::UpdatedAt,
            _ => ContentTypeSort::CreatedAt,
        }
    }

    fn column(self) -> &'static str {
        match self {
            ContentTypeSort::Id => "id",
            ContentTypeSort::Name => "name",
            ContentTypeSort::Slug => "slug",
            ContentTypeSort::CreatedAt => "created_at",
            ContentTypeSort::UpdatedAt => "updated_at",
        }
    }
}

impl ContentType {
    /// Find a content type by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<Self>> {
        let content_type = sqlx::query_as::<_, ContentType>(&format!(
            "SELECT {COLUMNS} FROM content_types WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(content_type)
    }

    /// Find a content type by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> AppResult<Option<Self>> {
        let content_type = sqlx::query_as::<_, ContentType>(&format!(
            "SELECT {COLUMNS} FROM content_types WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(content_type)
    }

    /// List one page of content types.
    pub async fn list(pool: &PgPool, query: &ListQuery<ContentTypeSort>) -> AppResult<Vec<Self>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM content_types ORDER BY {} LIMIT $1 OFFSET $2",
            query.order_clause()
        );
        debug!(order = %query.order_clause(), limit = query.limit, offset = query.offset, "listing content types");

        let types = sqlx::query_as::<_, ContentType>(&sql)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(pool)
            .await?;

        Ok(types)
    }

    /// Count all content types.
    pub async fn count(pool: &PgPool) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content_types")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Create a content type. `created_at` and `updated_at` share one timestamp.
    pub async fn create(pool: &PgPool, input: CreateContentType) -> AppResult<Self> {
        let id = Uuid::now_v7();

        let content_type = sqlx::query_as::<_, ContentType>(&format!(
            r#"
            INSERT INTO content_types (id, name, slug, description, schema)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.schema)
        .fetch_one(pool)
        .await
        .map_err(|e| classify_db_error(e, "content type"))?;

        Ok(content_type)
    }

    /// Apply a partial update and refresh `updated_at`.
    pub async fn update(pool: &PgPool, id: Uuid, input: UpdateContentType) -> AppResult<Self> {
        let content_type = sqlx::query_as::<_, ContentType>(&format!(
            r#"
            UPDATE content_types SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                schema = COALESCE($4, schema),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.schema)
        .fetch_optional(pool)
        .await
        .map_err(|e| classify_db_error(e, "content type"))?;

        content_type.ok_or_else(|| AppError::NotFound(format!("content type {id}")))
    }

    /// Delete a content type. Its entries go with it.
    pub async fn delete(pool: &PgPool, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM content_types WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("content type {id}")));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::sort::SortDirection;

    #[test]
    fn sort_allow_list() {
        assert_eq!(ContentTypeSort::from_param(Some("name")), ContentTypeSort::Name);
        assert_eq!(ContentTypeSort::from_param(Some("slug")), ContentTypeSort::Slug);
        assert_eq!(ContentTypeSort::from_param(Some("id")), ContentTypeSort::Id);
        assert_eq!(
            ContentTypeSort::from_param(Some("updated_at")),
            ContentTypeSort::UpdatedAt
        );
    }

    #[test]
    fn unknown_sort_falls_back_to_created_at() {
        assert_eq!(
            ContentTypeSort::from_param(Some("DROP TABLE x")),
            ContentTypeSort::CreatedAt
        );
        assert_eq!(ContentTypeSort::from_param(Some("Name")), ContentTypeSort::CreatedAt);
        assert_eq!(ContentTypeSort::from_param(None), ContentTypeSort::CreatedAt);
    }

    #[test]
    fn order_clause_uses_static_columns() {
        let query = ListQuery {
            limit: 10,
            offset: 0,
            order_by: ContentTypeSort::from_param(Some("name; DELETE FROM users")),
            direction: SortDirection::Asc,
        };
        assert_eq!(query.order_clause(), "created_at ASC, id ASC");
    }

    #[test]
    fn serializes_camel_case() {
        let now = Utc::now();
        let content_type = ContentType {
            id: Uuid::now_v7(),
            name: "Article".to_string(),
            slug: "article".to_string(),
            description: String::new(),
            schema: serde_json::json!({"type": "object"}),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&content_type).unwrap();
        assert_eq!(json["slug"], "article");
        assert_eq!(json["schema"]["type"], "object");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
