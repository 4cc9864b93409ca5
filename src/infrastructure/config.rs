//! Configuration management

use crate::error::{QuillError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub timeout_secs: u64,
    pub autosave_delay_ms: u64,
    pub persist_access_token: bool,
    pub editor: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            autosave_delay_ms: 400,
            persist_access_token: true,
            editor: Self::detect_default_editor(),
        }
    }
}

/// Resolve the directory holding config.toml and the stored session.
/// QUILL_HOME wins over the platform config directory.
pub fn resolve_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("QUILL_HOME") {
        return Ok(PathBuf::from(home));
    }

    ProjectDirs::from("", "", "quill")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            QuillError::Config(
                "Could not determine a config directory; set QUILL_HOME".to_string(),
            )
        })
}

impl Config {
    /// Load config.toml from the given directory, falling back to defaults if absent
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(CONFIG_FILE);

        let contents = match fs::read_to_string(&config_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(QuillError::Io(e)),
        };

        toml::from_str(&contents)
            .map_err(|e| QuillError::Config(format!("Failed to parse config.toml: {}", e)))
    }

    /// Save config.toml to the given directory
    pub fn save_to_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| QuillError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path.join(CONFIG_FILE), contents)?;

        Ok(())
    }

    /// Apply QUILL_API_URL on top of the stored value
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("QUILL_API_URL") {
            self.api_url = validate_api_url(&url)?;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// Get the editor command, checking environment variables first
    pub fn get_editor(&self) -> String {
        std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| self.editor.clone())
    }

    fn detect_default_editor() -> String {
        std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(windows) {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            })
    }
}

/// Check that a base URL is http(s) and strip trailing slashes
pub fn validate_api_url(value: &str) -> Result<String> {
    let url = reqwest::Url::parse(value.trim())
        .map_err(|e| QuillError::Config(format!("Invalid api_url '{}': {}", value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(value.trim().trim_end_matches('/').to_string()),
        other => Err(QuillError::Config(format!(
            "Invalid api_url '{}': unsupported scheme '{}'",
            value, other
        ))),
    }
}
