//! Config management use case

use crate::error::{QuillError, Result};
use crate::infrastructure::config::validate_api_url;
use crate::infrastructure::Config;
use std::path::PathBuf;

pub const VALID_KEYS: &str =
    "api_url, timeout_secs, autosave_delay_ms, persist_access_token, editor";

/// Service for managing client configuration
pub struct ConfigService {
    home: PathBuf,
}

impl ConfigService {
    /// Create a new config service rooted at the quill home directory
    pub fn new(home: PathBuf) -> Self {
        ConfigService { home }
    }

    /// Get a single config value
    pub fn get(&self, key: &str) -> Result<String> {
        let config = Config::load_from_dir(&self.home)?;

        match key {
            "api_url" => Ok(config.api_url),
            "timeout_secs" => Ok(config.timeout_secs.to_string()),
            "autosave_delay_ms" => Ok(config.autosave_delay_ms.to_string()),
            "persist_access_token" => Ok(config.persist_access_token.to_string()),
            "editor" => Ok(config.editor),
            _ => Err(unknown_key(key)),
        }
    }

    /// Set a config value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut config = Config::load_from_dir(&self.home)?;

        match key {
            "api_url" => config.api_url = validate_api_url(value)?,
            "timeout_secs" => config.timeout_secs = parse_number(key, value)?,
            "autosave_delay_ms" => config.autosave_delay_ms = parse_number(key, value)?,
            "persist_access_token" => {
                config.persist_access_token = value.parse().map_err(|_| {
                    QuillError::Config(format!(
                        "Invalid value for persist_access_token: '{}' (expected true or false)",
                        value
                    ))
                })?
            }
            "editor" => config.editor = value.to_string(),
            _ => return Err(unknown_key(key)),
        }

        config.save_to_dir(&self.home)
    }

    /// List all config values
    pub fn list(&self) -> Result<Config> {
        Config::load_from_dir(&self.home)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value.parse().map_err(|_| {
        QuillError::Config(format!(
            "Invalid value for {}: '{}' (expected a whole number)",
            key, value
        ))
    })
}

fn unknown_key(key: &str) -> QuillError {
    QuillError::Config(format!(
        "Unknown config key: '{}'. Valid keys are: {}",
        key, VALID_KEYS
    ))
}
