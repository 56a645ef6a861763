use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Why a bearer token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing or non-bearer Authorization header")]
    MissingToken,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    DuplicateEmail,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required feature: {0}")]
    MissingFeature(String),
    #[error("invalid disease type: {0}")]
    InvalidDiseaseType(String),
    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: String, reason: String },
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
}

impl ValidationError {
    pub fn out_of_range(field: &str, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("administrator access required")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Credential(CredentialError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::Credential(CredentialError::DuplicateEmail) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, %status, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}
