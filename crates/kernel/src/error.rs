//! Application error types.
//!
//! Stores only ever produce `NotFound`, `Conflict`, `Database`, or `Internal`.
//! The dispatcher adds `InvalidInput`, `Unauthorized`, `Forbidden`, and
//! `DeadlineExceeded` from argument, session, and deadline checks.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// SQLSTATE for unique constraint violations.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE for foreign key violations.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// SQLSTATEs for values a column cannot hold: too long for a `VARCHAR`,
/// `\u0000` in JSONB, and NUL in text.
const PG_UNSTORABLE_VALUE: [&str; 3] = ["22001", "22P05", "22021"];

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::DeadlineExceeded => "DEADLINE_EXCEEDED",
            AppError::Internal(_) | AppError::Database(_) => "INTERNAL",
        }
    }

    /// HTTP status used by the transport.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to a caller.
    ///
    /// Driver and hashing details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) | AppError::Database(_) => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Classify a backing-store error.
///
/// Unique violations become `Conflict`, foreign key violations become
/// `NotFound`, and values a column cannot hold become `InvalidInput`;
/// anything else is passed through as `Database`.
pub fn classify_db_error(err: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            Some(PG_UNIQUE_VIOLATION) => {
                return AppError::Conflict(format!("{what} already exists"));
            }
            Some(PG_FOREIGN_KEY_VIOLATION) => {
                return AppError::NotFound(format!("{what} references a missing row"));
            }
            Some(code) if PG_UNSTORABLE_VALUE.contains(&code) => {
                return AppError::InvalidInput(format!(
                    "{what} has a value too long or not storable"
                ));
            }
            _ => {}
        }
    }
    AppError::Database(err)
}

/// Error body returned by the transport.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error kind and message.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(e) => tracing::error!(error = %e, "internal server error"),
            AppError::Database(e) => tracing::error!(error = %e, "database error"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.code(),
                message: self.public_message(),
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
