//! Infrastructure layer - External I/O and persistence

pub mod config;
pub mod editor;
pub mod endpoints;
pub mod token_store;

pub use config::Config;
pub use editor::EditorSession;
pub use endpoints::Endpoints;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
