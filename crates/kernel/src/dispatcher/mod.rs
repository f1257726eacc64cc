//! Operation dispatcher.
//!
//! Resolves a named operation into argument checks, one store call, and a
//! flat result record. The bearer token is resolved once per request into an
//! optional acting session which is then passed explicitly to the handlers.
//!
//! Every mutation is a single store round trip, so a failed operation leaves
//! state unchanged.

mod auth;
mod content;
pub mod operation;
pub mod result;

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

pub use operation::{DEFAULT_LIMIT, MAX_LIMIT, Operation};

/// Longest name, slug, or email the backing store holds, in characters.
pub const MAX_TEXT_LEN: usize = 255;

/// Longest entry status the backing store holds, in characters.
pub const MAX_STATUS_LEN: usize = 50;
pub use result::{AuthPayload, OperationResult, Page, PageInfo};

use crate::error::{AppError, AppResult};
use crate::session::{Session, SessionStore};
use crate::store::{ContentEntryStore, ContentTypeStore, UserStore};

/// Per-request inputs that are not operation arguments.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Bearer token, if the caller sent one.
    pub token: Option<String>,

    /// Point after which the operation is abandoned.
    pub deadline: Option<Instant>,

    /// Fires when the caller goes away.
    pub cancel: Option<CancellationToken>,
}

impl RequestContext {
    /// Context carrying an optional bearer token.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            ..Default::default()
        }
    }

    /// Abandon the operation once `timeout` has elapsed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Abandon the operation when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Routes operations to stores.
pub struct Dispatcher {
    users: Arc<dyn UserStore>,
    content_types: Arc<dyn ContentTypeStore>,
    entries: Arc<dyn ContentEntryStore>,
    sessions: Arc<SessionStore>,
    require_auth: bool,
}

impl Dispatcher {
    /// Create a dispatcher. Mutation-class operations require a session.
    pub fn new(
        users: Arc<dyn UserStore>,
        content_types: Arc<dyn ContentTypeStore>,
        entries: Arc<dyn ContentEntryStore>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            users,
            content_types,
            entries,
            sessions,
            require_auth: true,
        }
    }

    /// Toggle the session requirement on mutation-class operations.
    pub fn require_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }

    /// The session store backing authentication.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Run an operation to completion, or until the context's deadline
    /// passes or its cancellation token fires.
    ///
    /// Abandoning drops the in-flight store future, which returns its
    /// connection to the pool.
    pub async fn dispatch(&self, op: Operation, ctx: RequestContext) -> AppResult<OperationResult> {
        let name = op.name();
        let token = ctx.token.as_deref();
        let session = token.and_then(|t| self.sessions.get_session(t));

        if token.is_some() && session.is_none() {
            debug!(operation = name, "bearer token did not resolve to a live session");
        }

        let deadline = async {
            match ctx.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending().await,
            }
        };
        let cancelled = async {
            match &ctx.cancel {
                Some(cancel) => cancel.cancelled().await,
                None => pending().await,
            }
        };

        tokio::select! {
            result = self.execute(op, token, session.as_ref()) => result,
            () = deadline => {
                warn!(operation = name, "operation deadline exceeded");
                Err(AppError::DeadlineExceeded)
            }
            () = cancelled => {
                debug!(operation = name, "operation abandoned by caller");
                Err(AppError::DeadlineExceeded)
            }
        }
    }

    async fn execute(
        &self,
        op: Operation,
        token: Option<&str>,
        session: Option<&Session>,
    ) -> AppResult<OperationResult> {
        if self.require_auth && op.requires_session() && session.is_none() {
            warn!(operation = op.name(), "rejected operation without a live session");
            return Err(AppError::Unauthorized("authentication required".to_string()));
        }

        match op {
            Operation::ContentTypes(args) => self
                .list_content_types(args)
                .await
                .map(OperationResult::ContentTypes),
            Operation::ContentType(args) => self
                .get_content_type(args)
                .await
                .map(OperationResult::ContentType),
            Operation::ContentTypeBySlug(args) => self
                .get_content_type_by_slug(args)
                .await
                .map(OperationResult::ContentType),
            Operation::Content(args) => self
                .list_content(args)
                .await
                .map(OperationResult::ContentEntries),
            Operation::ContentEntry(args) => self
                .get_content_entry(args)
                .await
                .map(OperationResult::ContentEntry),
            Operation::Register(args) => self.register(args).await.map(OperationResult::User),
            Operation::Login(args) => self.login(args).await.map(OperationResult::Auth),
            Operation::Logout => Ok(OperationResult::Success(self.logout(token))),
            Operation::CreateContentType(args) => self
                .create_content_type(args)
                .await
                .map(OperationResult::ContentType),
            Operation::UpdateContentType(args) => self
                .update_content_type(args)
                .await
                .map(OperationResult::ContentType),
            Operation::DeleteContentType(args) => self
                .delete_content_type(args)
                .await
                .map(OperationResult::Success),
            Operation::CreateContent(args) => self
                .create_content(args, session)
                .await
                .map(OperationResult::ContentEntry),
            Operation::UpdateContent(args) => self
                .update_content(args)
                .await
                .map(OperationResult::ContentEntry),
            Operation::DeleteContent(args) => self
                .delete_content(args)
                .await
                .map(OperationResult::Success),
        }
    }
}

/// Trimmed value of a required string argument.
fn required<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// An optional argument, treating blank as not supplied.
fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reject text containing NUL, which Postgres text columns cannot hold.
fn no_nul<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    if value.contains('\0') {
        return Err(AppError::InvalidInput(format!(
            "{field} must not contain NUL characters"
        )));
    }
    Ok(value)
}

/// Reject text longer than its column allows.
fn bounded<'a>(field: &str, value: &'a str, max_chars: usize) -> AppResult<&'a str> {
    let value = no_nul(field, value)?;
    if value.chars().count() > max_chars {
        return Err(AppError::InvalidInput(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value)
}

fn parse_id(value: &str) -> AppResult<Uuid> {
    let value = required("id", value)?;
    Uuid::parse_str(value).map_err(|_| AppError::InvalidInput(format!("invalid id '{value}'")))
}

/// Parse a JSON document argument. Only syntax is checked, plus the one
/// thing JSONB refuses that JSON allows: `\u0000` in strings or keys.
fn parse_json(field: &str, value: &str) -> AppResult<serde_json::Value> {
    let doc: serde_json::Value = serde_json::from_str(value)
        .map_err(|e| AppError::InvalidInput(format!("invalid {field} JSON: {e}")))?;

    if contains_nul(&doc) {
        return Err(AppError::InvalidInput(format!(
            "invalid {field} JSON: \\u0000 is not supported"
        )));
    }
    Ok(doc)
}

fn contains_nul(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::String(s) => s.contains('\0'),
        serde_json::Value::Array(items) => items.iter().any(contains_nul),
        serde_json::Value::Object(map) => map
            .iter()
            .any(|(key, value)| key.contains('\0') || contains_nul(value)),
        _ => false,
    }
}
