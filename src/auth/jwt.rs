use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{
    config::JwtConfig,
    error::{AppError, AuthError},
    state::AppState,
};

/// JWT payload. The admin flag is fixed at issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject email
    pub admin: bool,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// The caller as asserted by a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub is_admin: bool,
}

/// One year; longer lifetimes are clamped.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs(cfg.ttl_minutes.clamp(0, MAX_TTL_MINUTES) as u64 * 60),
        }
    }

    pub fn issue(&self, subject: &str, is_admin: bool) -> Result<String, AppError> {
        self.issue_at(subject, is_admin, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(
        &self,
        subject: &str,
        is_admin: bool,
        now: OffsetDateTime,
    ) -> Result<String, AppError> {
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: subject.to_string(),
            admin: is_admin,
            iat: now.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| anyhow::anyhow!("jwt encode: {e}"))?;
        debug!(subject = %subject, admin = is_admin, "jwt signed");
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::ImmatureSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            }
        })?;
        debug!(subject = %data.claims.sub, "jwt verified");
        Ok(Identity {
            email: data.claims.sub,
            is_admin: data.claims.admin,
        })
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

/// Extracts and validates the bearer token.
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
            .ok_or(AuthError::MissingToken)?;

        match keys.validate(token.trim()) {
            Ok(identity) => Ok(AuthUser(identity)),
            Err(e) => {
                warn!(error = %e, "token rejected");
                Err(e.into())
            }
        }
    }
}
