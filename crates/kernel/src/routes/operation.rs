//! Operation endpoint.
//!
//! `POST /api/operation` takes an [`Operation`] body and an optional bearer
//! token, and answers `{"data": ...}` on success or `{"error": {...}}`.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::dispatcher::{Operation, OperationResult, RequestContext};
use crate::error::{AppError, AppResult};
use crate::middleware::BearerToken;
use crate::state::AppState;

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct OperationResponse {
    pub data: OperationResult,
}

async fn run_operation(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    body: Result<Json<Operation>, JsonRejection>,
) -> AppResult<Json<OperationResponse>> {
    let Json(op) = body.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

    let ctx = RequestContext::new(token).with_timeout(state.request_timeout());
    let data = state.dispatcher().dispatch(op, ctx).await?;

    Ok(Json(OperationResponse { data }))
}

/// Create the operation router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/operation", post(run_operation))
}
