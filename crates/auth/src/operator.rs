use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one authenticated session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// An authenticated operator acting on the tracker.
///
/// Only [`crate::SharedCredentials::authenticate`] hands these out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    login: String,
    session_id: SessionId,
    authenticated_at: DateTime<Utc>,
}

impl Operator {
    pub(crate) fn new(login: impl Into<String>, authenticated_at: DateTime<Utc>) -> Self {
        Self {
            login: login.into(),
            session_id: SessionId::new(),
            authenticated_at,
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }
}
