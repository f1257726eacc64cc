//! Storage seams used by the dispatcher.
//!
//! The dispatcher only ever talks to these traits. `PgUserStore`,
//! `PgContentTypeStore`, and `PgContentEntryStore` execute against Postgres;
//! tests substitute in-memory implementations.
//!
//! Stores surface only `NotFound`, `Conflict`, and internal errors. Argument
//! validation, session checks, and JSON parsing happen before a store is
//! called, so every value reaching a store is already well-formed.

mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

pub use postgres::{PgContentEntryStore, PgContentTypeStore, PgUserStore};

use crate::error::AppResult;
use crate::models::{
    ContentEntry, ContentEntrySort, ContentType, ContentTypeSort, CreateContentEntry,
    CreateContentType, ListQuery, UpdateContentEntry, UpdateContentType, User,
};

/// Single-account user storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. A duplicate email or a second account is `Conflict`.
    async fn create_user(&self, email: &str, password: &str) -> AppResult<User>;

    /// Look up a user by email. Missing is `NotFound`.
    async fn get_user_by_email(&self, email: &str) -> AppResult<User>;

    /// Number of registered users.
    async fn count_users(&self) -> AppResult<i64>;

    /// Verify a password against the user's stored hash.
    fn check_password(&self, user: &User, password: &str) -> bool {
        user.verify_password(password)
    }
}

/// Content type storage.
#[async_trait]
pub trait ContentTypeStore: Send + Sync {
    async fn create(&self, input: CreateContentType) -> AppResult<ContentType>;

    async fn get(&self, id: Uuid) -> AppResult<ContentType>;

    async fn get_by_slug(&self, slug: &str) -> AppResult<ContentType>;

    /// One page of content types plus the total count.
    async fn list(&self, query: ListQuery<ContentTypeSort>) -> AppResult<(Vec<ContentType>, i64)>;

    /// Partial update returning the stored record.
    async fn update(&self, id: Uuid, input: UpdateContentType) -> AppResult<ContentType>;

    /// Delete a content type and, through the backing store, its entries.
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Content entry storage, scoped by content type for listings.
#[async_trait]
pub trait ContentEntryStore: Send + Sync {
    async fn create(&self, input: CreateContentEntry) -> AppResult<ContentEntry>;

    async fn get(&self, id: Uuid) -> AppResult<ContentEntry>;

    /// One page of a content type's entries plus their total count.
    async fn list(
        &self,
        content_type_id: Uuid,
        query: ListQuery<ContentEntrySort>,
    ) -> AppResult<(Vec<ContentEntry>, i64)>;

    /// Partial update returning the stored record.
    async fn update(&self, id: Uuid, input: UpdateContentEntry) -> AppResult<ContentEntry>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}
