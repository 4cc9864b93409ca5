//! Note models exchanged with the notes API

use pulldown_cmark::{Event, Parser as MdParser, TagEnd};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "New Note";
pub const DEFAULT_MARKDOWN: &str = "Your content here";

/// A note as returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub pinned: bool,
}

/// Body for creating a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub title: String,
    pub markdown: String,
    pub pinned: bool,
}

impl Default for NewNote {
    fn default() -> Self {
        NewNote {
            title: DEFAULT_TITLE.to_string(),
            markdown: DEFAULT_MARKDOWN.to_string(),
            pinned: false,
        }
    }
}

/// Partial update; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

impl NotePatch {
    pub fn pinned(pinned: bool) -> Self {
        NotePatch {
            pinned: Some(pinned),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.markdown.is_none() && self.pinned.is_none()
    }
}

/// Title and body being edited, as pushed to autosave
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub markdown: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, markdown: impl Into<String>) -> Self {
        NoteDraft {
            title: title.into(),
            markdown: markdown.into(),
        }
    }

    /// Blank drafts are never saved
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.markdown.is_empty()
    }
}

impl From<&Note> for NoteDraft {
    fn from(note: &Note) -> Self {
        NoteDraft::new(note.title.clone(), note.markdown.clone())
    }
}

impl From<&NoteDraft> for NotePatch {
    fn from(draft: &NoteDraft) -> Self {
        NotePatch {
            title: Some(draft.title.clone()),
            markdown: Some(draft.markdown.clone()),
            pinned: None,
        }
    }
}

/// Stable sort putting pinned notes first; server order is kept within each group
pub fn sort_pinned_first(notes: &mut [Note]) {
    notes.sort_by_key(|note| !note.pinned);
}

/// Plain-text preview of a markdown body, at most `max_chars` characters
pub fn excerpt(markdown: &str, max_chars: usize) -> String {
    let mut text = String::new();
    for event in MdParser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Heading(_)) => text.push(' '),
            Event::End(TagEnd::Item) => text.push(' '),
            _ => {}
        }
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let mut cut: String = collapsed.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
