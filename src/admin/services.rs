use tracing::info;
use uuid::Uuid;

use crate::{
    auth::jwt::Identity,
    error::AppError,
    ledger::{ContactMessage, LedgerStats, PredictionRecord, User},
    predict::disease::DiseaseType,
    state::AppState,
};

use super::authority::require_admin;

pub async fn list_users(state: &AppState, identity: &Identity) -> Result<Vec<User>, AppError> {
    require_admin(identity, &state.config)?;
    state.ledger.list_users().await
}

/// Removes the user together with their history and messages.
pub async fn delete_user(
    state: &AppState,
    identity: &Identity,
    user_id: Uuid,
) -> Result<u64, AppError> {
    require_admin(identity, &state.config)?;
    let removed = state.ledger.delete_owner_cascade(user_id).await?;
    info!(admin = %identity.email, %user_id, predictions = removed, "user deleted");
    Ok(removed)
}

pub async fn list_predictions(
    state: &AppState,
    identity: &Identity,
) -> Result<Vec<PredictionRecord>, AppError> {
    require_admin(identity, &state.config)?;
    state.ledger.list_all().await
}

pub async fn stats(state: &AppState, identity: &Identity) -> Result<LedgerStats, AppError> {
    require_admin(identity, &state.config)?;
    state.ledger.stats().await
}

/// `disease` is the raw path segment; unknown names fail before any query.
pub async fn cohort(
    state: &AppState,
    identity: &Identity,
    disease: &str,
) -> Result<Vec<User>, AppError> {
    require_admin(identity, &state.config)?;
    let disease: DiseaseType = disease.parse()?;
    state.ledger.cohort(disease).await
}

pub async fn list_messages(
    state: &AppState,
    identity: &Identity,
) -> Result<Vec<ContactMessage>, AppError> {
    require_admin(identity, &state.config)?;
    state.ledger.list_messages().await
}
