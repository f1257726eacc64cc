//! Postgres implementations of the store traits.
//!
//! Each method is a thin wrapper over the model functions, turning a missing
//! row into `NotFound`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ContentEntryStore, ContentTypeStore, UserStore};
use crate::error::{AppError, AppResult};
use crate::models::{
    ContentEntry, ContentEntrySort, ContentType, ContentTypeSort, CreateContentEntry,
    CreateContentType, ListQuery, UpdateContentEntry, UpdateContentType, User,
};

/// User store backed by the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, email: &str, password: &str) -> AppResult<User> {
        User::create(&self.pool, email, password).await
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        User::find_by_email(&self.pool, email)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))
    }

    async fn count_users(&self) -> AppResult<i64> {
        User::count(&self.pool).await
    }
}

/// Content type store backed by the `content_types` table.
#[derive(Clone)]
pub struct PgContentTypeStore {
    pool: PgPool,
}

impl PgContentTypeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentTypeStore for PgContentTypeStore {
    async fn create(&self, input: CreateContentType) -> AppResult<ContentType> {
        ContentType::create(&self.pool, input).await
    }

    async fn get(&self, id: Uuid) -> AppResult<ContentType> {
        ContentType::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("content type {id}")))
    }

    async fn get_by_slug(&self, slug: &str) -> AppResult<ContentType> {
        ContentType::find_by_slug(&self.pool, slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("content type '{slug}'")))
    }

    async fn list(&self, query: ListQuery<ContentTypeSort>) -> AppResult<(Vec<ContentType>, i64)> {
        let items = ContentType::list(&self.pool, &query).await?;
        let total = ContentType::count(&self.pool).await?;
        Ok((items, total))
    }

    async fn update(&self, id: Uuid, input: UpdateContentType) -> AppResult<ContentType> {
        ContentType::update(&self.pool, id, input).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        ContentType::delete(&self.pool, id).await
    }
}

/// Content entry store backed by the `content_entries` table.
#[derive(Clone)]
pub struct PgContentEntryStore {
    pool: PgPool,
}

impl PgContentEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentEntryStore for PgContentEntryStore {
    async fn create(&self, input: CreateContentEntry) -> AppResult<ContentEntry> {
        ContentEntry::create(&self.pool, input).await
    }

    async fn get(&self, id: Uuid) -> AppResult<ContentEntry> {
        ContentEntry::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("content entry {id}")))
    }

    async fn list(
        &self,
        content_type_id: Uuid,
        query: ListQuery<ContentEntrySort>,
    ) -> AppResult<(Vec<ContentEntry>, i64)> {
        let items = ContentEntry::list_by_type(&self.pool, content_type_id, &query).await?;
        let total = ContentEntry::count_by_type(&self.pool, content_type_id).await?;
        Ok((items, total))
    }

    async fn update(&self, id: Uuid, input: UpdateContentEntry) -> AppResult<ContentEntry> {
        ContentEntry::update(&self.pool, id, input).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        ContentEntry::delete(&self.pool, id).await
    }
}
