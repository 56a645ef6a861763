use tracing::warn;

use crate::{auth::jwt::Identity, config::AppConfig, error::AppError};

/// Admin if the token says so, or if the email is the configured superuser.
pub fn is_admin_user(identity: &Identity, superuser_email: Option<&str>) -> bool {
    identity.is_admin || superuser_email.is_some_and(|su| su == identity.email)
}

/// Gate for every administrative operation. Call before touching storage.
pub fn require_admin(identity: &Identity, config: &AppConfig) -> Result<(), AppError> {
    if is_admin_user(identity, config.superuser_email.as_deref()) {
        Ok(())
    } else {
        warn!(email = %identity.email, "admin access denied");
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn who(email: &str, is_admin: bool) -> Identity {
        Identity {
            email: email.into(),
            is_admin,
        }
    }

    #[test]
    fn superuser_email_is_admin_without_flag() {
        assert!(is_admin_user(&who("root@x.com", false), Some("root@x.com")));
    }

    #[test]
    fn admin_flag_is_enough_for_any_email() {
        assert!(is_admin_user(&who("anyone@x.com", true), Some("root@x.com")));
        assert!(is_admin_user(&who("anyone@x.com", true), None));
    }

    #[test]
    fn plain_user_is_not_admin() {
        assert!(!is_admin_user(&who("u@x.com", false), Some("root@x.com")));
        assert!(!is_admin_user(&who("u@x.com", false), None));
        // exact match only
        assert!(!is_admin_user(&who("ROOT@x.com", false), Some("root@x.com")));
    }
}
