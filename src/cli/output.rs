//! Output formatting utilities

use crate::domain::jwt::decode_claims;
use crate::domain::note::excerpt;
use crate::domain::{Note, Session};
use chrono::{DateTime, Utc};

const EXCERPT_CHARS: usize = 48;

/// Format the note list for display
pub fn format_note_list(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "No notes available.".to_string();
    }

    let mut output = String::new();
    for note in notes {
        let marker = if note.pinned { "*" } else { " " };
        let preview = excerpt(&note.markdown, EXCERPT_CHARS);
        if preview.is_empty() {
            output.push_str(&format!("{} {:>4}  {}\n", marker, note.id, note.title));
        } else {
            output.push_str(&format!(
                "{} {:>4}  {}  - {}\n",
                marker, note.id, note.title, preview
            ));
        }
    }
    output
}

/// Format a single note in full
pub fn format_note(note: &Note) -> String {
    let mut output = format!("# {}\n", note.title);
    if note.pinned {
        output.push_str("(pinned)\n");
    }
    output.push('\n');
    output.push_str(&note.markdown);
    if !note.markdown.ends_with('\n') {
        output.push('\n');
    }
    output
}

/// Describe the session, including access token claims when readable
pub fn format_status(session: &Session, now: DateTime<Utc>) -> String {
    let Some(access) = session.access_token() else {
        return if session.refresh_token().is_some() {
            "Not logged in (refresh token held; next request will refresh)".to_string()
        } else {
            "Not logged in".to_string()
        };
    };

    let mut output = String::from("Logged in\n");
    if let Some(claims) = decode_claims(access) {
        if let Some(user) = claims.user() {
            output.push_str(&format!("user id: {}\n", user));
        }
        if let Some(at) = claims.expires_at() {
            let state = if claims.is_expired_at(now) {
                "expired"
            } else {
                "expires"
            };
            output.push_str(&format!("access token {}: {}\n", state, at.to_rfc3339()));
        }
    }
    if session.refresh_token().is_none() {
        output.push_str("no refresh token held\n");
    }
    output
}
