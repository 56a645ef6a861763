use tracing::info;

use crate::{
    auth::{jwt::Identity, services::current_user},
    error::AppError,
    ledger::NewPrediction,
    state::AppState,
};

use super::{disease::DiseaseType, features::RawFields, gateway::Outcome};

/// Classifies for the caller and appends the outcome to their history.
/// Returns the outcome and the new history id.
pub async fn predict(
    state: &AppState,
    identity: &Identity,
    disease: DiseaseType,
    fields: &RawFields,
) -> Result<(Outcome, i64), AppError> {
    let owner = current_user(state, identity).await?;
    let outcome = state.gateway.predict(disease, fields)?;
    let id = state
        .ledger
        .record(owner.id, &NewPrediction::from(&outcome))
        .await?;
    info!(user_id = %owner.id, %disease, label = outcome.label, history_id = id, "prediction recorded");
    Ok((outcome, id))
}
