#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`MemoryStore`] implements every store trait over plain vectors so the
//! dispatcher can be exercised without Postgres. It mirrors the backing
//! store's constraints: unique names, slugs and emails, a single account,
//! and cascading deletes from content types to their entries.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use uuid::Uuid;

use quire_kernel::models::user::hash_password;
use quire_kernel::models::{
    ContentEntry, ContentEntrySort, ContentType, ContentTypeSort, CreateContentEntry,
    CreateContentType, ListQuery, SortDirection, UpdateContentEntry, UpdateContentType, User,
};
use quire_kernel::store::{ContentEntryStore, ContentTypeStore, UserStore};
use quire_kernel::{
    AppError, AppResult, Clock, Dispatcher, Operation, OperationResult, RequestContext,
    SessionStore,
};

/// Clock that only moves when told to.
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: RwLock::new(Utc::now()),
        })
    }

    pub fn advance(&self, by: Duration) {
        *self.now.write() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    content_types: Vec<ContentType>,
    entries: Vec<ContentEntry>,
}

/// In-memory implementation of all three stores.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entry_count(&self) -> usize {
        self.tables.lock().entries.len()
    }

    pub fn content_type_count(&self) -> usize {
        self.tables.lock().content_types.len()
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().users.len()
    }

    /// Set `published_at` directly; no operation writes it.
    pub fn set_published_at(&self, id: Uuid, published_at: Option<DateTime<Utc>>) {
        if let Some(entry) = self.tables.lock().entries.iter_mut().find(|e| e.id == id) {
            entry.published_at = published_at;
        }
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Postgres ordering for a nullable column: NULL sorts after every value, so
/// it comes last under ASC and first under DESC.
fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

fn page<T: Clone>(rows: &[T], limit: i64, offset: i64) -> Vec<T> {
    rows.iter()
        .skip(usize::try_from(offset).unwrap())
        .take(usize::try_from(limit).unwrap())
        .cloned()
        .collect()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, email: &str, password: &str) -> AppResult<User> {
        let password_hash = hash_password(password)?;
        let mut tables = self.tables.lock();

        // Same outcome as the single-account and unique email indexes.
        if !tables.users.is_empty() {
            return Err(AppError::Conflict("user already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        self.tables
            .lock()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| AppError::NotFound("user".to_string()))
    }

    async fn count_users(&self) -> AppResult<i64> {
        Ok(self.tables.lock().users.len() as i64)
    }
}

#[async_trait]
impl ContentTypeStore for MemoryStore {
    async fn create(&self, input: CreateContentType) -> AppResult<ContentType> {
        let mut tables = self.tables.lock();
        if tables
            .content_types
            .iter()
            .any(|t| t.name == input.name || t.slug == input.slug)
        {
            return Err(AppError::Conflict("content type already exists".to_string()));
        }

        let now = Utc::now();
        let content_type = ContentType {
            id: Uuid::now_v7(),
            name: input.name,
            slug: input.slug,
            description: input.description,
            schema: input.schema,
            created_at: now,
            updated_at: now,
        };
        tables.content_types.push(content_type.clone());
        Ok(content_type)
    }

    async fn get(&self, id: Uuid) -> AppResult<ContentType> {
        self.tables
            .lock()
            .content_types
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("content type {id}")))
    }

    async fn get_by_slug(&self, slug: &str) -> AppResult<ContentType> {
        self.tables
            .lock()
            .content_types
            .iter()
            .find(|t| t.slug == slug)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("content type '{slug}'")))
    }

    async fn list(&self, query: ListQuery<ContentTypeSort>) -> AppResult<(Vec<ContentType>, i64)> {
        let mut rows = self.tables.lock().content_types.clone();
        rows.sort_by(|a, b| {
            let primary = match query.order_by {
                ContentTypeSort::Id => a.id.cmp(&b.id),
                ContentTypeSort::Name => a.name.cmp(&b.name),
                ContentTypeSort::Slug => a.slug.cmp(&b.slug),
                ContentTypeSort::CreatedAt => a.created_at.cmp(&b.created_at),
                ContentTypeSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            directed(primary.then_with(|| a.id.cmp(&b.id)), query.direction)
        });

        Ok((page(&rows, query.limit, query.offset), rows.len() as i64))
    }

    async fn update(&self, id: Uuid, input: UpdateContentType) -> AppResult<ContentType> {
        let mut tables = self.tables.lock();
        if let Some(name) = &input.name {
            if tables.content_types.iter().any(|t| t.id != id && &t.name == name) {
                return Err(AppError::Conflict("content type already exists".to_string()));
            }
        }

        let content_type = tables
            .content_types
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound(format!("content type {id}")))?;

        if let Some(name) = input.name {
            content_type.name = name;
        }
        if let Some(description) = input.description {
            content_type.description = description;
        }
        if let Some(schema) = input.schema {
            content_type.schema = schema;
        }
        content_type.updated_at = Utc::now();
        Ok(content_type.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.lock();
        let before = tables.content_types.len();
        tables.content_types.retain(|t| t.id != id);
        if tables.content_types.len() == before {
            return Err(AppError::NotFound(format!("content type {id}")));
        }
        tables.entries.retain(|e| e.content_type_id != id);
        Ok(())
    }
}

#[async_trait]
impl ContentEntryStore for MemoryStore {
    async fn create(&self, input: CreateContentEntry) -> AppResult<ContentEntry> {
        let mut tables = self.tables.lock();
        if !tables
            .content_types
            .iter()
            .any(|t| t.id == input.content_type_id)
        {
            return Err(AppError::NotFound("content entry references a missing row".to_string()));
        }

        let now = Utc::now();
        let entry = ContentEntry {
            id: Uuid::now_v7(),
            content_type_id: input.content_type_id,
            status: input.effective_status().to_string(),
            data: input.data,
            created_by: input.created_by,
            created_at: now,
            updated_at: now,
            published_at: None,
        };
        tables.entries.push(entry.clone());
        Ok(entry)
    }

    async fn get(&self, id: Uuid) -> AppResult<ContentEntry> {
        self.tables
            .lock()
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("content entry {id}")))
    }

    async fn list(
        &self,
        content_type_id: Uuid,
        query: ListQuery<ContentEntrySort>,
    ) -> AppResult<(Vec<ContentEntry>, i64)> {
        let mut rows: Vec<ContentEntry> = self
            .tables
            .lock()
            .entries
            .iter()
            .filter(|e| e.content_type_id == content_type_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            let primary = match query.order_by {
                ContentEntrySort::Id => a.id.cmp(&b.id),
                ContentEntrySort::CreatedAt => a.created_at.cmp(&b.created_at),
                ContentEntrySort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                ContentEntrySort::PublishedAt => nulls_last(a.published_at, b.published_at),
                ContentEntrySort::Status => a.status.cmp(&b.status),
            };
            directed(primary.then_with(|| a.id.cmp(&b.id)), query.direction)
        });

        Ok((page(&rows, query.limit, query.offset), rows.len() as i64))
    }

    async fn update(&self, id: Uuid, input: UpdateContentEntry) -> AppResult<ContentEntry> {
        let mut tables = self.tables.lock();
        let entry = tables
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(format!("content entry {id}")))?;

        if let Some(data) = input.data {
            entry.data = data;
        }
        if let Some(status) = input.status {
            entry.status = status;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.lock();
        let before = tables.entries.len();
        tables.entries.retain(|e| e.id != id);
        if tables.entries.len() == before {
            return Err(AppError::NotFound(format!("content entry {id}")));
        }
        Ok(())
    }
}

/// Dispatcher over a fresh [`MemoryStore`] with a manual clock.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub dispatcher: Dispatcher,
}

impl TestApp {
    /// Mutation-class operations require a session.
    pub fn new() -> Self {
        Self::with_require_auth(true)
    }

    pub fn with_require_auth(require_auth: bool) -> Self {
        let store = MemoryStore::new();
        let clock = ManualClock::new();
        let sessions = Arc::new(SessionStore::with_clock(Duration::hours(24), clock.clone()));
        let dispatcher = Dispatcher::new(store.clone(), store.clone(), store.clone(), sessions)
            .require_auth(require_auth);

        Self {
            store,
            clock,
            dispatcher,
        }
    }

    /// Dispatch a JSON-described operation.
    pub async fn run(&self, body: Value, token: Option<&str>) -> AppResult<OperationResult> {
        let op: Operation = serde_json::from_value(body).expect("operation should decode");
        self.dispatcher
            .dispatch(op, RequestContext::new(token.map(str::to_string)))
            .await
    }

    /// Register the operator account and log in, returning the token.
    pub async fn login_operator(&self) -> String {
        let creds = quire_test_utils::credentials("operator@example.com", "correct horse");
        self.run(quire_test_utils::operation("register", creds.clone()), None)
            .await
            .expect("register should succeed");

        match self
            .run(quire_test_utils::operation("login", creds), None)
            .await
            .expect("login should succeed")
        {
            OperationResult::Auth(payload) => payload.token,
            other => panic!("expected auth payload, got {other:?}"),
        }
    }

    /// Create a content type as the given session and return it.
    pub async fn create_type(&self, token: Option<&str>, slug_prefix: &str) -> ContentType {
        let fixture = quire_test_utils::test_content_type(slug_prefix);
        match self
            .run(
                quire_test_utils::operation("createContentType", fixture.arguments()),
                token,
            )
            .await
            .expect("createContentType should succeed")
        {
            OperationResult::ContentType(content_type) => content_type,
            other => panic!("expected content type, got {other:?}"),
        }
    }

    /// Create an entry under `type_slug` and return it.
    pub async fn create_entry(&self, token: Option<&str>, type_slug: &str, title: &str) -> ContentEntry {
        let args = quire_test_utils::test_entry(title).arguments(type_slug);
        match self
            .run(quire_test_utils::operation("createContent", args), token)
            .await
            .expect("createContent should succeed")
        {
            OperationResult::ContentEntry(entry) => entry,
            other => panic!("expected content entry, got {other:?}"),
        }
    }
}
