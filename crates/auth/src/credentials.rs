use chrono::Utc;
use thiserror::Error;

use crate::operator::Operator;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid login or password")]
    InvalidCredentials,

    #[error("credentials not configured: {0}")]
    NotConfigured(String),
}

/// The single login/password pair shared by everyone using the tracker.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedCredentials {
    login: String,
    password: String,
}

impl core::fmt::Debug for SharedCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedCredentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl SharedCredentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Result<Self, AuthError> {
        let login = login.into();
        let password = password.into();
        if login.trim().is_empty() {
            return Err(AuthError::NotConfigured("login is empty".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::NotConfigured("password is empty".to_string()));
        }
        Ok(Self { login, password })
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    /// Check a login attempt. The login is compared after trimming, the
    /// password byte-for-byte.
    pub fn authenticate(&self, login: &str, password: &str) -> Result<Operator, AuthError> {
        let login_ok = login.trim() == self.login.trim();
        let password_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        if !(login_ok && password_ok) {
            tracing::warn!(login = login.trim(), "rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let operator = Operator::new(self.login.trim(), Utc::now());
        tracing::info!(
            login = operator.login(),
            session = %operator.session_id(),
            at = %operator.authenticated_at(),
            "operator authenticated"
        );
        Ok(operator)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_pair_yields_operator() {
        let creds = SharedCredentials::new("admin", "s3cret").unwrap();
        let before = Utc::now();
        let op = creds.authenticate(" admin ", "s3cret").unwrap();
        assert_eq!(op.login(), "admin");
        assert!(op.authenticated_at() >= before);
        assert!(op.authenticated_at() <= Utc::now());
    }

    #[test]
    fn wrong_password_or_login_is_rejected() {
        let creds = SharedCredentials::new("admin", "s3cret").unwrap();
        assert_eq!(creds.authenticate("admin", "s3cret "), Err(AuthError::InvalidCredentials));
        assert_eq!(creds.authenticate("root", "s3cret"), Err(AuthError::InvalidCredentials));
        assert_eq!(creds.authenticate("admin", ""), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn each_login_gets_its_own_session() {
        let creds = SharedCredentials::new("admin", "pw").unwrap();
        let a = creds.authenticate("admin", "pw").unwrap();
        let b = creds.authenticate("admin", "pw").unwrap();
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn blank_configuration_is_refused() {
        assert!(matches!(SharedCredentials::new(" ", "pw"), Err(AuthError::NotConfigured(_))));
        assert!(matches!(SharedCredentials::new("admin", ""), Err(AuthError::NotConfigured(_))));
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = SharedCredentials::new("admin", "hunter2").unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
