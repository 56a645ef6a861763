use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user =
        services::register(&state, &payload.email, &payload.password, payload.is_admin).await?;
    let access_token = JwtKeys::from_ref(&state).issue(&user.email, user.is_admin)?;
    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer",
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (access_token, user) =
        services::authenticate(&state, &payload.email, &payload.password).await?;
    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer",
        user: user.into(),
    }))
}

#[instrument(skip(state, identity))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = services::current_user(&state, &identity).await?;
    Ok(Json(user.into()))
}
