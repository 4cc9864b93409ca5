//! Error types for quill

use thiserror::Error;

/// Main error type for quill
#[derive(Debug, Error)]
pub enum QuillError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Login failed: {0}")]
    InvalidCredentials(String),

    #[error("Signup failed: {0}")]
    Registration(String),

    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    #[error("Failed to save note {0}")]
    SaveFailed(i64),

    #[error("Server error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not reach backend.")]
    Network(#[source] reqwest::Error),

    /// Backend unreachable before any session existed (login, signup)
    #[error("Could not reach backend.")]
    Unreachable(#[source] reqwest::Error),

    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl From<reqwest::Error> for QuillError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            QuillError::InvalidResponse(e.to_string())
        } else {
            QuillError::Network(e)
        }
    }
}

impl QuillError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            QuillError::NotLoggedIn | QuillError::SessionExpired => 2,
            QuillError::InvalidCredentials(_) => 3,
            QuillError::NoteNotFound(_) => 4,
            QuillError::Network(_) | QuillError::Unreachable(_) => 5,
            _ => 1,
        }
    }

    /// True for failures that leave the stored session intact and may succeed later
    pub fn is_transient(&self) -> bool {
        match self {
            QuillError::Network(_) | QuillError::Unreachable(_) => true,
            QuillError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            QuillError::NotLoggedIn => "Not logged in\n\n\
                Suggestions:\n\
                • Run 'quill login <username>' to sign in\n\
                • Run 'quill signup <username> <email>' to create an account"
                .to_string(),
            QuillError::SessionExpired => "Session expired, please log in again\n\n\
                Suggestions:\n\
                • Run 'quill login <username>' to start a new session"
                .to_string(),
            QuillError::InvalidCredentials(detail) => {
                format!(
                    "Login failed: {}\n\n\
                    Suggestions:\n\
                    • Check your username and password\n\
                    • Run 'quill signup' if you don't have an account yet",
                    detail
                )
            }
            QuillError::NoteNotFound(id) => {
                format!(
                    "Note not found: {}\n\n\
                    Suggestions:\n\
                    • Use 'quill list' to see your notes and their ids",
                    id
                )
            }
            QuillError::Network(_) => "Could not reach backend.\n\n\
                Your session has been kept.\n\n\
                Suggestions:\n\
                • Check that the server is running\n\
                • Check the configured URL: quill config api_url\n\
                • Set QUILL_API_URL to point at a different server"
                .to_string(),
            QuillError::Unreachable(_) => "Could not reach backend.\n\n\
                Suggestions:\n\
                • Check that the server is running\n\
                • Check the configured URL: quill config api_url"
                .to_string(),
            QuillError::Editor(msg) => {
                format!(
                    "{}\n\n\
                    Suggestions:\n\
                    • Check that your editor is installed and in PATH\n\
                    • Set EDITOR environment variable (e.g., export EDITOR=nano)\n\
                    • Configure editor: quill config editor 'vim'\n\
                    • Edit without an editor: quill edit <id> --markdown '...'",
                    msg
                )
            }
            QuillError::Config(msg) => {
                if msg.contains("api_url") {
                    format!(
                        "{}\n\n\
                        Expected an http or https URL\n\
                        Example: quill config api_url http://127.0.0.1:8000",
                        msg
                    )
                } else {
                    msg.clone()
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using QuillError
pub type Result<T> = std::result::Result<T, QuillError>;
