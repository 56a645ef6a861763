use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::AppError,
    ledger::{ContactMessage, LedgerStats, PredictionRecord, User},
    state::AppState,
};

use super::services;

#[derive(Debug, Serialize)]
pub struct DeletedUserResponse {
    pub id: Uuid,
    pub predictions_deleted: u64,
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/predictions", get(list_predictions))
        .route("/admin/stats", get(stats))
        .route("/admin/cohort/:disease_type", get(cohort))
        .route("/admin/messages", get(list_messages))
}

#[instrument(skip(state, identity))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(services::list_users(&state, &identity).await?))
}

#[instrument(skip(state, identity))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedUserResponse>, AppError> {
    let predictions_deleted = services::delete_user(&state, &identity, id).await?;
    Ok(Json(DeletedUserResponse {
        id,
        predictions_deleted,
    }))
}

#[instrument(skip(state, identity))]
pub async fn list_predictions(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<PredictionRecord>>, AppError> {
    Ok(Json(services::list_predictions(&state, &identity).await?))
}

#[instrument(skip(state, identity))]
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<LedgerStats>, AppError> {
    Ok(Json(services::stats(&state, &identity).await?))
}

#[instrument(skip(state, identity))]
pub async fn cohort(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(disease_type): Path<String>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(services::cohort(&state, &identity, &disease_type).await?))
}

#[instrument(skip(state, identity))]
pub async fn list_messages(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<ContactMessage>>, AppError> {
    Ok(Json(services::list_messages(&state, &identity).await?))
}
