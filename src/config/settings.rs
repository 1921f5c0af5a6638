//! Settings file handling.
//!
//! Settings live in a JSON file under the XDG config directory. Every field is
//! optional in the file; missing fields fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::XdgDirs;
use crate::backend::BackendKind;

/// First system message shown in a new conversation
pub const DEFAULT_GREETING: &str =
    "Hi! Ask me anything, or paste Rust code below and press F5 to analyze it.";

/// Error type for settings operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Persistent client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Transport used to reach the backend
    pub backend: BackendKind,
    /// Gateway URL, or the completion API base (e.g. `http://localhost:11434/v1`)
    pub base_url: String,
    /// Model name, used by the `llm` backend
    pub model: String,
    /// Optional bearer token. `${VAR}` is expanded from the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request deadline
    pub timeout_secs: u64,
    /// First system message of a new conversation
    pub greeting: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Http,
            base_url: "http://127.0.0.1:8080".to_string(),
            model: "llama3.1:8b".to_string(),
            api_key: None,
            timeout_secs: 120,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default path, or defaults if the file is absent.
    pub fn load_default() -> Result<Self, SettingsError> {
        let path = Self::default_config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    /// Load settings from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&content)?;
        settings.api_key = settings.api_key.as_deref().map(resolve_env_var).transpose()?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(settings)
    }

    /// Load from `path` when given, otherwise from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load_default(),
        }
    }

    /// Save settings to a specific path.
    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration path.
    pub fn default_config_path() -> PathBuf {
        XdgDirs::new().config_file()
    }
}

/// Resolve `$VAR` and `${VAR}` references from the environment.
///
/// Expansion is a single pass, so values are never re-expanded.
fn resolve_env_var(input: &str) -> Result<String, SettingsError> {
    shellexpand::full(input)
        .map(|s| s.into_owned())
        .map_err(|e| SettingsError::EnvVarNotFound(e.var_name))
}
