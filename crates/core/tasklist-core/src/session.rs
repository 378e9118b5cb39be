//! Bearer token lifecycle: anonymous → authenticated → expired.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated,
    /// The task service stopped accepting our token
    Expired,
}

/// Holds the bearer token issued at login.
///
/// Serializes as its bare state; the token itself is never written out, so a
/// restored authenticated session comes back as expired.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SessionState", from = "SessionState")]
pub struct Session {
    state: SessionState,
    token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Store a freshly issued token. Returns whether the token changed.
    pub fn authenticate(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        let changed = self.token.as_deref() != Some(token.as_str());
        self.state = SessionState::Authenticated;
        self.token = Some(token);
        changed
    }

    /// Drop a token the server no longer accepts. Only an authenticated
    /// session can expire; returns whether it did.
    pub fn expire(&mut self) -> bool {
        if self.state != SessionState::Authenticated {
            return false;
        }
        self.state = SessionState::Expired;
        self.token = None;
        true
    }

    pub fn sign_out(&mut self) {
        self.state = SessionState::Anonymous;
        self.token = None;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl From<Session> for SessionState {
    fn from(session: Session) -> Self {
        session.state
    }
}

impl From<SessionState> for Session {
    fn from(state: SessionState) -> Self {
        let state = match state {
            SessionState::Authenticated => SessionState::Expired,
            other => other,
        };
        Self { state, token: None }
    }
}
