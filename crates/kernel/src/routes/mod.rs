//! HTTP route handlers.

pub mod health;
pub mod operation;

use axum::Router;

use crate::state::AppState;

/// All kernel routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(operation::router())
}
