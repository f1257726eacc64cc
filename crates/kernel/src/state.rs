//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::dispatcher::Dispatcher;
use crate::session::SessionStore;
use crate::store::{PgContentEntryStore, PgContentTypeStore, PgUserStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Operation dispatcher over the Postgres stores.
    dispatcher: Dispatcher,

    /// Deadline handed to every operation.
    request_timeout: Duration,
}

impl AppState {
    /// Connect to Postgres, apply migrations, and wire the stores.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;
        info!("Connected to PostgreSQL");

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
        info!("Database migrations applied");

        let sessions = Arc::new(SessionStore::new(config.session_ttl()));
        let dispatcher = Dispatcher::new(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgContentTypeStore::new(pool.clone())),
            Arc::new(PgContentEntryStore::new(pool.clone())),
            sessions,
        )
        .require_auth(config.require_auth);

        Ok(Self::from_parts(pool, dispatcher, config.request_timeout()))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(db: PgPool, dispatcher: Dispatcher, request_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                dispatcher,
                request_timeout,
            }),
        }
    }

    /// Get the database pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get the operation dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// Per-operation deadline.
    pub fn request_timeout(&self) -> Duration {
        self.inner.request_timeout
    }

    /// Check if PostgreSQL is healthy.
    pub async fn postgres_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}
