//! Note use cases

use crate::application::session_manager::RequestOptions;
use crate::application::SessionManager;
use crate::domain::api_error::detail_message;
use crate::domain::{sort_pinned_first, NewNote, Note, NotePatch};
use crate::error::{QuillError, Result};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// CRUD over `/api/notes/`, always through the session manager
#[derive(Clone)]
pub struct NotesService {
    session: Arc<SessionManager>,
}

impl NotesService {
    pub fn new(session: Arc<SessionManager>) -> Self {
        NotesService { session }
    }

    /// Fail early when no token of either kind is held
    pub fn ensure_session(&self) -> Result<()> {
        if self.session.session().has_credentials() {
            Ok(())
        } else {
            Err(QuillError::NotLoggedIn)
        }
    }

    /// All notes, pinned first. A body that is not a JSON array counts as empty.
    pub async fn list(&self) -> Result<Vec<Note>> {
        let url = self.session.endpoints().notes();
        let response = self
            .session
            .authenticated_request(&url, &RequestOptions::get())
            .await?;
        let body: Value = check(response, None).await?.json().await?;

        let mut notes = match body {
            Value::Array(_) => serde_json::from_value::<Vec<Note>>(body)?,
            _ => {
                debug!("notes endpoint returned a non-array body");
                Vec::new()
            }
        };
        sort_pinned_first(&mut notes);
        Ok(notes)
    }

    pub async fn get(&self, id: i64) -> Result<Note> {
        let url = self.session.endpoints().note(id);
        let response = self
            .session
            .authenticated_request(&url, &RequestOptions::get())
            .await?;
        Ok(check(response, Some(id)).await?.json().await?)
    }

    pub async fn create(&self, note: &NewNote) -> Result<Note> {
        let url = self.session.endpoints().notes();
        let options = RequestOptions::post(serde_json::to_value(note)?);
        let response = self.session.authenticated_request(&url, &options).await?;
        Ok(check(response, None).await?.json().await?)
    }

    /// PATCH the given fields; last write wins
    pub async fn update(&self, id: i64, patch: &NotePatch) -> Result<Note> {
        let url = self.session.endpoints().note(id);
        let options = RequestOptions::patch(serde_json::to_value(patch)?);
        let response = self.session.authenticated_request(&url, &options).await?;
        Ok(check(response, Some(id)).await?.json().await?)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let url = self.session.endpoints().note(id);
        let response = self
            .session
            .authenticated_request(&url, &RequestOptions::delete())
            .await?;
        check(response, Some(id)).await?;
        Ok(())
    }
}

/// Map a non-success response onto the error taxonomy
async fn check(response: Response, id: Option<i64>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => return Err(QuillError::NoteNotFound(id)),
        (StatusCode::UNAUTHORIZED, _) => return Err(QuillError::SessionExpired),
        _ => {}
    }

    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    let message = detail_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    Err(QuillError::Api {
        status: status.as_u16(),
        message,
    })
}

/// In-memory note list backing the home view.
///
/// Creation appends the server's object; every other mutation re-fetches.
pub struct NoteBoard {
    service: NotesService,
    notes: Vec<Note>,
}

impl NoteBoard {
    pub fn new(service: NotesService) -> Self {
        NoteBoard {
            service,
            notes: Vec::new(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub async fn reload(&mut self) -> Result<&[Note]> {
        self.notes = self.service.list().await?;
        Ok(&self.notes)
    }

    /// Create a note and add the server-assigned object to the list
    pub async fn create(&mut self, note: &NewNote) -> Result<Note> {
        let created = self.service.create(note).await?;
        self.notes.push(created.clone());
        sort_pinned_first(&mut self.notes);
        Ok(created)
    }

    pub async fn set_pinned(&mut self, id: i64, pinned: bool) -> Result<Note> {
        let updated = self.service.update(id, &NotePatch::pinned(pinned)).await?;
        self.reload().await?;
        Ok(updated)
    }

    pub async fn remove(&mut self, id: i64) -> Result<()> {
        self.service.delete(id).await?;
        self.reload().await?;
        Ok(())
    }
}
