//! Debounced autosave of note edits
//!
//! Every edit replaces the pending draft and restarts the quiet-period timer;
//! only the latest draft is saved once edits pause.

use crate::application::NotesService;
use crate::domain::{NoteDraft, NotePatch};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Destination of debounced drafts
#[async_trait]
pub trait DraftSink: Send + Sync + 'static {
    async fn save_draft(&self, note_id: i64, draft: &NoteDraft) -> Result<()>;
}

#[async_trait]
impl DraftSink for NotesService {
    async fn save_draft(&self, note_id: i64, draft: &NoteDraft) -> Result<()> {
        self.update(note_id, &NotePatch::from(draft)).await.map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Failed,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SaveStatus::Idle => "",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved!",
            SaveStatus::Failed => "Failed to save.",
        };
        f.write_str(text)
    }
}

/// One editing session's autosave timer
pub struct AutoSaver {
    drafts: mpsc::UnboundedSender<NoteDraft>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl AutoSaver {
    pub fn spawn<S: DraftSink>(sink: Arc<S>, note_id: i64, delay: Duration) -> Self {
        let (drafts, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::Idle);
        let task = tokio::spawn(run(sink, note_id, delay, rx, status_tx));

        AutoSaver {
            drafts,
            status,
            task,
        }
    }

    /// Queue a draft. Blank drafts are ignored.
    pub fn update(&self, draft: NoteDraft) {
        if draft.is_blank() {
            return;
        }
        if self.drafts.send(draft).is_err() {
            warn!("autosave task has stopped; draft dropped");
        }
    }

    pub fn status(&self) -> SaveStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Save any pending draft immediately and stop
    pub async fn finish(self) -> SaveStatus {
        let AutoSaver {
            drafts,
            status,
            task,
        } = self;
        drop(drafts);

        if let Err(e) = task.await {
            warn!("autosave task ended abnormally: {}", e);
            return SaveStatus::Failed;
        }
        let final_status = *status.borrow();
        final_status
    }
}

async fn run<S: DraftSink>(
    sink: Arc<S>,
    note_id: i64,
    delay: Duration,
    mut drafts: mpsc::UnboundedReceiver<NoteDraft>,
    status: watch::Sender<SaveStatus>,
) {
    let mut pending: Option<NoteDraft> = None;

    loop {
        match pending.take() {
            None => match drafts.recv().await {
                Some(draft) => {
                    status.send_replace(SaveStatus::Saving);
                    pending = Some(draft);
                }
                None => break,
            },
            Some(draft) => {
                tokio::select! {
                    next = drafts.recv() => match next {
                        Some(newer) => pending = Some(newer),
                        None => {
                            save(sink.as_ref(), note_id, &draft, &status).await;
                            break;
                        }
                    },
                    _ = tokio::time::sleep(delay) => {
                        save(sink.as_ref(), note_id, &draft, &status).await;
                    }
                }
            }
        }
    }
}

async fn save<S: DraftSink>(
    sink: &S,
    note_id: i64,
    draft: &NoteDraft,
    status: &watch::Sender<SaveStatus>,
) {
    debug!(note_id, "autosaving draft");
    let next = match sink.save_draft(note_id, draft).await {
        Ok(()) => SaveStatus::Saved,
        Err(e) => {
            warn!(note_id, "autosave failed: {}", e);
            SaveStatus::Failed
        }
    };
    status.send_replace(next);
}
