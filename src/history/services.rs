use tracing::info;

use crate::{
    auth::{jwt::Identity, services::current_user},
    error::{AppError, ValidationError},
    ledger::{ContactMessage, NewContactMessage, PredictionRecord},
    state::AppState,
};

pub async fn list_my_history(
    state: &AppState,
    identity: &Identity,
) -> Result<Vec<PredictionRecord>, AppError> {
    let owner = current_user(state, identity).await?;
    state.ledger.list_by_owner(owner.id).await
}

/// Returns how many records were removed; zero is not an error.
pub async fn delete_my_history(state: &AppState, identity: &Identity) -> Result<u64, AppError> {
    let owner = current_user(state, identity).await?;
    let removed = state.ledger.delete_all_by_owner(owner.id).await?;
    info!(user_id = %owner.id, removed, "history cleared");
    Ok(removed)
}

/// The sender email always comes from the token.
pub async fn submit_contact_message(
    state: &AppState,
    identity: &Identity,
    name: &str,
    subject: &str,
    message: &str,
) -> Result<ContactMessage, AppError> {
    for (field, value) in [("name", name), ("subject", subject), ("message", message)] {
        if value.trim().is_empty() {
            return Err(ValidationError::out_of_range(field, "must not be empty").into());
        }
    }
    let owner = current_user(state, identity).await?;
    let saved = state
        .ledger
        .submit_message(&NewContactMessage {
            owner_id: owner.id,
            name: name.trim().to_string(),
            email: owner.email.clone(),
            subject: subject.trim().to_string(),
            message: message.to_string(),
        })
        .await?;
    info!(user_id = %owner.id, message_id = saved.id, "contact message stored");
    Ok(saved)
}
