use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    error::{AppError, CredentialError, ValidationError},
    ledger::User,
    state::AppState,
};

use super::{
    jwt::{Identity, JwtKeys},
    password::{hash_password, verify_password},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Creates the account. Emails are trimmed and otherwise kept as given.
pub async fn register(
    state: &AppState,
    email: &str,
    password: &str,
    is_admin: bool,
) -> Result<User, AppError> {
    let email = email.trim();
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(ValidationError::out_of_range("email", "not a valid address").into());
    }

    let hash = hash_password(password)?;
    let user = state.ledger.create_user(email, &hash, is_admin).await?;
    info!(user_id = %user.id, email = %user.email, is_admin, "user registered");
    Ok(user)
}

/// Verifies credentials and issues a bearer token.
pub async fn authenticate(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<(String, User), AppError> {
    let email = email.trim();
    let Some(user) = state.ledger.find_user_by_email(email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(CredentialError::InvalidCredentials.into());
    };

    if !verify_password(password, &user.password_hash) {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(CredentialError::InvalidCredentials.into());
    }

    let token = JwtKeys::from_ref(state).issue(&user.email, user.is_admin)?;
    info!(user_id = %user.id, "user logged in");
    Ok((token, user))
}

/// Resolves the token subject to its stored account.
pub async fn current_user(state: &AppState, identity: &Identity) -> Result<User, AppError> {
    state
        .ledger
        .find_user_by_email(&identity.email)
        .await?
        .ok_or(AppError::UserNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("u@x.com"));
        assert!(!is_valid_email("u@x"));
        assert!(!is_valid_email("no spaces@x.com"));
    }

    #[tokio::test]
    async fn register_then_authenticate_yields_subject() {
        let state = AppState::fake();
        register(&state, "u@x.com", "pw", false).await.unwrap();
        let (token, user) = authenticate(&state, "u@x.com", "pw").await.unwrap();
        assert_eq!(user.email, "u@x.com");
        let identity = JwtKeys::from_ref(&state).validate(&token).unwrap();
        assert_eq!(identity.email, "u@x.com");
        assert!(!identity.is_admin);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let state = AppState::fake();
        register(&state, "u@x.com", "pw", false).await.unwrap();
        let err = register(&state, "u@x.com", "other", false).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Credential(CredentialError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn emails_are_case_sensitive() {
        let state = AppState::fake();
        register(&state, "u@x.com", "pw", false).await.unwrap();
        register(&state, "U@x.com", "pw", false).await.unwrap();
        let err = authenticate(&state, "U@X.COM", "pw").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Credential(CredentialError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let state = AppState::fake();
        register(&state, "u@x.com", "pw", false).await.unwrap();
        let a = authenticate(&state, "u@x.com", "nope").await.unwrap_err();
        let b = authenticate(&state, "ghost@x.com", "pw").await.unwrap_err();
        assert_eq!(a.to_string(), b.to_string());
    }

    #[tokio::test]
    async fn empty_password_is_rejected_before_storage() {
        let state = AppState::fake();
        let err = register(&state, "u@x.com", "", false).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(state.ledger.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_flag_is_carried_in_the_token() {
        let state = AppState::fake();
        register(&state, "boss@x.com", "pw", true).await.unwrap();
        let (token, _) = authenticate(&state, "boss@x.com", "pw").await.unwrap();
        assert!(JwtKeys::from_ref(&state).validate(&token).unwrap().is_admin);
    }
}
