//! quill - Terminal client for a notes REST API
//!
//! Logs in with JWT credentials, keeps the token pair on disk, refreshes the
//! access token transparently and manages notes through the server's API.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::QuillError;
