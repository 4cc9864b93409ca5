//! Application layer - Use cases and orchestration

pub mod auth;
pub mod autosave;
pub mod manage_config;
pub mod notes;
pub mod session_manager;

pub use auth::AuthService;
pub use autosave::{AutoSaver, DraftSink, SaveStatus};
pub use manage_config::ConfigService;
pub use notes::{NoteBoard, NotesService};
pub use session_manager::{RefreshOutcome, RequestOptions, SessionManager};
