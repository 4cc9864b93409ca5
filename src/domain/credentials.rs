//! Credential exchange payloads

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

/// Body of `POST /api/token/`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Body of `POST /api/register/`
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl Registration {
    /// Local checks before anything is sent. Password confirmation is left to the server.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username is required".to_string());
        }
        if !self.email.is_empty() && !email_regex().is_match(&self.email) {
            return Err(format!("Invalid email address: {}", self.email));
        }
        if self.password.is_empty() || self.password2.is_empty() {
            return Err("Password and confirmation are required".to_string());
        }
        Ok(())
    }
}

/// Response of `POST /api/token/`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Body of `POST /api/token/refresh/`
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response of `POST /api/token/refresh/`
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshedToken {
    pub access: String,
}
