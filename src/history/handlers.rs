use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    auth::jwt::AuthUser,
    error::AppError,
    ledger::{ContactMessage, PredictionRecord},
    state::AppState,
};

use super::services;

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

/// No sender email here; it comes from the token.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub subject: String,
    pub message: String,
}

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(list_history).delete(delete_history))
        .route("/contact", post(submit_contact))
}

#[instrument(skip(state, identity))]
pub async fn list_history(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<PredictionRecord>>, AppError> {
    Ok(Json(services::list_my_history(&state, &identity).await?))
}

#[instrument(skip(state, identity))]
pub async fn delete_history(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = services::delete_my_history(&state, &identity).await?;
    Ok(Json(DeletedResponse { deleted }))
}

#[instrument(skip(state, identity, payload))]
pub async fn submit_contact(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactMessage>), AppError> {
    let saved = services::submit_contact_message(
        &state,
        &identity,
        &payload.name,
        &payload.subject,
        &payload.message,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}
