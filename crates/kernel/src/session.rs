//! In-memory session store for bearer tokens.
//!
//! Sessions live only in process memory and are lost on restart. Lookups
//! take a shared read lock so concurrent readers never block each other;
//! creation, deletion, and purging take the write lock. An expired session
//! is reported exactly like a missing one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppResult;

/// Default session expiry (24 hours).
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24;

/// Random payload length of a session token, in bytes.
const TOKEN_BYTES: usize = 32;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Token to session map guarded by a reader/writer lock.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Create a store backed by the wall clock.
    pub fn new(ttl: chrono::Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a store with an explicit clock.
    pub fn with_clock(ttl: chrono::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Mint a token for the user and remember it until the TTL elapses.
    pub fn create_session(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        let token = generate_token()?;
        let session = Session {
            user_id,
            email: email.to_string(),
            expires_at: self.clock.now() + self.ttl,
        };

        self.sessions.write().insert(token.clone(), session);
        debug!(user_id = %user_id, "session created");

        Ok(token)
    }

    /// Look up a live session.
    pub fn get_session(&self, token: &str) -> Option<Session> {
        let now = self.clock.now();
        let sessions = self.sessions.read();

        sessions
            .get(token)
            .filter(|session| now < session.expires_at)
            .cloned()
    }

    /// Remove a session. Missing tokens are ignored.
    pub fn delete_session(&self, token: &str) {
        self.sessions.write().remove(token);
    }

    /// Drop every expired session and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| now < session.expires_at);
        before - sessions.len()
    }

    /// Number of stored sessions, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Periodically purge expired sessions until `shutdown` is cancelled.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        every: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = self.purge_expired();
                        if removed > 0 {
                            debug!(removed, remaining = self.len(), "purged expired sessions");
                        }
                    }
                }
            }
        })
    }
}

/// Generate a URL-safe token from the OS random source.
fn generate_token() -> AppResult<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| anyhow::anyhow!("failed to read random source: {e}"))?;

    Ok(URL_SAFE.encode(bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation() {
        let t1 = generate_token().unwrap();
        let t2 = generate_token().unwrap();
        assert_ne!(t1, t2);

        // 32 bytes of base64 with padding
        assert_eq!(t1.len(), 44);
        assert!(
            t1.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '=')
        );
    }

    #[test]
    fn test_session_round_trip() {
        let store = SessionStore::new(chrono::Duration::hours(DEFAULT_SESSION_EXPIRY_HOURS));
        let user_id = Uuid::now_v7();

        let token = store.create_session(user_id, "a@x.com").unwrap();
        let session = store.get_session(&token).unwrap();

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.email, "a@x.com");
        assert!(session.expires_at > Utc::now());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = SessionStore::new(chrono::Duration::hours(1));
        let token = store.create_session(Uuid::now_v7(), "a@x.com").unwrap();

        store.delete_session(&token);
        store.delete_session(&token);
        store.delete_session("never-issued");

        assert!(store.get_session(&token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_sessions_coexist_per_user() {
        let store = SessionStore::new(chrono::Duration::hours(1));
        let user_id = Uuid::now_v7();

        let first = store.create_session(user_id, "a@x.com").unwrap();
        let second = store.create_session(user_id, "a@x.com").unwrap();

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
        assert!(store.get_session(&first).is_some());
        assert!(store.get_session(&second).is_some());
    }
}
