use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::jwt::{AuthUser, Identity},
    error::AppError,
    state::AppState,
};

use super::{
    dto::{DiabetesInput, HeartDiseaseInput, PredictInput, PredictionResponse, StrokeInput},
    services,
};

pub fn predict_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict_diabetes))
        .route("/predict/diabetes", post(predict_diabetes))
        .route("/predict/heart", post(predict_heart))
        .route("/predict/stroke", post(predict_stroke))
}

async fn run<I: PredictInput>(
    state: &AppState,
    identity: &Identity,
    input: I,
) -> Result<Json<PredictionResponse>, AppError> {
    let fields = input.into_fields()?;
    let (outcome, history_id) = services::predict(state, identity, I::DISEASE, &fields).await?;
    Ok(Json(PredictionResponse {
        prediction: outcome.label,
        result: outcome.result,
        prediction_type: outcome.disease,
        history_id,
    }))
}

#[instrument(skip(state, identity, input))]
pub async fn predict_diabetes(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(input): Json<DiabetesInput>,
) -> Result<Json<PredictionResponse>, AppError> {
    run(&state, &identity, input).await
}

#[instrument(skip(state, identity, input))]
pub async fn predict_heart(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(input): Json<HeartDiseaseInput>,
) -> Result<Json<PredictionResponse>, AppError> {
    run(&state, &identity, input).await
}

#[instrument(skip(state, identity, input))]
pub async fn predict_stroke(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(input): Json<StrokeInput>,
) -> Result<Json<PredictionResponse>, AppError> {
    run(&state, &identity, input).await
}
