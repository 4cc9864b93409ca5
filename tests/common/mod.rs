#![allow(dead_code)]

use assert_cmd::Command;
use quill::application::SessionManager;
use quill::infrastructure::{Endpoints, MemoryTokenStore};
use std::path::Path;
use std::sync::Arc;

pub fn quill_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("quill").unwrap();
    cmd.env("QUILL_HOME", home);
    cmd.env_remove("QUILL_API_URL");
    cmd.env_remove("QUILL_LOG");
    cmd.env_remove("EDITOR");
    cmd.env_remove("VISUAL");
    cmd
}

/// Session manager against `base_url` backed by an inspectable in-memory store
pub fn manager_with(
    base_url: &str,
    tokens: &[(&str, &str)],
) -> (Arc<SessionManager>, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::with_values(tokens.iter().copied()));
    let manager = SessionManager::new(
        reqwest::Client::new(),
        Endpoints::new(base_url),
        Box::new(store.clone()),
        true,
    )
    .unwrap();
    (Arc::new(manager), store)
}
