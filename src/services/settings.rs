//! Engine configuration.
//!
//! Settings are persisted as a JSON file. A missing file yields defaults, and
//! so does an unreadable one (with a warning), so a first run never fails.

use crate::error::AppError;
use crate::services::repositories::RepositoryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default autosave interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 5;

/// Autosave configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutosaveSettings {
    /// Interval between background saves in seconds.
    pub interval_secs: u64,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
        }
    }
}

/// Document generation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentSettings {
    /// Product codes listed in the "Products" section.
    pub products: Vec<String>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            products: vec!["0179".to_string(), "0796".to_string()],
        }
    }
}

/// Version table configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepositorySettings {
    /// What happens to edited rows when the table is rebuilt.
    pub policy: RepositoryPolicy,
}

/// Task tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerSettings {
    /// Host accepted in task links (e.g., `tracker.yandex.ru`).
    pub host: String,

    /// Task key prefix (e.g., `SPD`).
    pub task_prefix: String,

    /// REST API base URL.
    pub api_base_url: String,

    /// OAuth token; required by the network provider.
    pub token: String,

    /// Organization ID sent as `X-Org-ID`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            host: "tracker.yandex.ru".to_string(),
            task_prefix: "SPD".to_string(),
            api_base_url: "https://api.tracker.yandex.net".to_string(),
            token: String::new(),
            org_id: None,
            timeout_secs: 30,
        }
    }
}

/// Code-hosting service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeHostSettings {
    /// Base host name of pull request links; subdomain chains after it are accepted.
    pub host_base: String,

    /// REST API base URL.
    pub api_base_url: String,

    /// Bearer token; empty sends unauthenticated requests (public repositories only).
    pub token: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CodeHostSettings {
    fn default() -> Self {
        Self {
            host_base: "github".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// RFC title length bounds, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleSettings {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for TitleSettings {
    fn default() -> Self {
        Self {
            min_len: 5,
            max_len: 100,
        }
    }
}

impl TitleSettings {
    /// Validate an RFC title against the bounds.
    pub fn validate(&self, title: &str) -> Result<(), AppError> {
        let len = title.chars().count();
        if len < self.min_len {
            return Err(AppError::invalid_input_field(
                format!("Title must be at least {} characters", self.min_len),
                "title",
            ));
        }
        if len > self.max_len {
            return Err(AppError::invalid_input_field(
                format!("Title must not exceed {} characters", self.max_len),
                "title",
            ));
        }
        Ok(())
    }
}

/// Engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    pub autosave: AutosaveSettings,
    pub document: DocumentSettings,
    pub repositories: RepositorySettings,
    pub tracker: TrackerSettings,
    pub code_host: CodeHostSettings,
    pub titles: TitleSettings,
}

/// Load settings from a JSON file, using defaults if not found.
pub fn load_settings(path: &Path) -> Result<EngineSettings, AppError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(EngineSettings::default());
        }
        Err(e) => {
            return Err(AppError::storage_with_op(
                format!("Failed to read settings: {}", e),
                "load_settings",
            ))
        }
    };

    match serde_json::from_str(&raw) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            log::warn!("Ignoring malformed settings file {}: {}", path.display(), e);
            Ok(EngineSettings::default())
        }
    }
}

/// Save settings to a JSON file.
pub fn save_settings(path: &Path, settings: &EngineSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::storage_with_op(
                format!("Failed to create settings directory: {}", e),
                "save_settings",
            )
        })?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json).map_err(|e| {
        AppError::storage_with_op(format!("Failed to save settings: {}", e), "save_settings")
    })
}
