//! Domain layer - Session and note models

pub mod api_error;
pub mod credentials;
pub mod jwt;
pub mod note;
pub mod session;

pub use credentials::{Credentials, Registration, TokenPair};
pub use note::{sort_pinned_first, NewNote, Note, NoteDraft, NotePatch};
pub use session::{Phase, Session, SessionState};
