//! Session state: the access/refresh token pair and where it is in its lifecycle

use std::fmt;

/// Observable lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No access token held
    Anonymous,
    /// Credential exchange in flight
    LoggingIn,
    /// Access token held
    Authenticated,
    /// Token refresh in flight
    Refreshing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Anonymous => "anonymous",
            SessionState::LoggingIn => "logging in",
            SessionState::Authenticated => "authenticated",
            SessionState::Refreshing => "refreshing",
        };
        f.write_str(name)
    }
}

/// Transient phase layered over the token pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    LoggingIn,
    Refreshing,
}

/// Access/refresh token pair. Empty strings are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    phase: Phase,
}

fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}

impl Session {
    pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Session {
            access_token: non_empty(access_token),
            refresh_token: non_empty(refresh_token),
            phase: Phase::Idle,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Logged in exactly when an access token is held
    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }

    /// True when either token is held, so a request can at least attempt a refresh
    pub fn has_credentials(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::LoggingIn => SessionState::LoggingIn,
            Phase::Refreshing => SessionState::Refreshing,
            Phase::Idle if self.is_logged_in() => SessionState::Authenticated,
            Phase::Idle => SessionState::Anonymous,
        }
    }

    pub fn with_phase(&self, phase: Phase) -> Self {
        Session {
            phase,
            ..self.clone()
        }
    }

    /// Session after a successful credential exchange
    pub fn logged_in(access_token: String, refresh_token: String) -> Self {
        Session::new(Some(access_token), Some(refresh_token))
    }

    /// Same refresh token, new access token, back to idle
    pub fn with_access_token(&self, access_token: String) -> Self {
        Session::new(Some(access_token), self.refresh_token.clone())
    }

    pub fn cleared() -> Self {
        Session::default()
    }
}
