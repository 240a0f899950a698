use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Storage partition shared by every content view.
pub const DEFAULT_PARTITION: &str = "persist:default";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SearchEngine {
    DuckDuckGo,
    Google,
    Bing,
    Brave,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::DuckDuckGo
    }
}

impl SearchEngine {
    pub fn query_url(&self, query: &str) -> String {
        let q = urlencoding::encode(query);
        match self {
            Self::DuckDuckGo => format!("https://duckduckgo.com/?q={}", q),
            Self::Google => format!("https://google.com/search?q={}", q),
            Self::Bing => format!("https://bing.com/search?q={}", q),
            Self::Brave => format!("https://search.brave.com/search?q={}", q),
        }
    }
}

/// Whether a freshly created content view starts active (visible, rendering) or parked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WebviewState {
    #[default]
    Activated,
    Deactivated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub homepage: String,
    pub search_engine: SearchEngine,
    pub https_only: bool,
    pub zoom_factor: f64,
    pub default_webview_state: WebviewState,
    pub useragent_override: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            homepage: "https://duckduckgo.com".to_string(),
            search_engine: SearchEngine::default(),
            https_only: true,
            zoom_factor: 1.0,
            default_webview_state: WebviewState::default(),
            useragent_override: None,
        }
    }
}

impl Settings {
    /// Reads settings from `path`. A missing or unreadable file yields defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("[Settings] Failed to parse settings: {}, returning defaults", e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("[Settings] Failed to read file: {}, returning defaults", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, &serde_json::to_string_pretty(self)?)
    }

    pub fn session(&self) -> SessionSettings {
        SessionSettings {
            zoom_factor: self.zoom_factor,
            default_webview_state: self.default_webview_state,
            useragent_override: self.useragent_override.clone(),
            partition: DEFAULT_PARTITION.to_string(),
        }
    }
}

/// Process-wide settings read whenever a content view is created.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub zoom_factor: f64,
    pub default_webview_state: WebviewState,
    pub useragent_override: Option<String>,
    pub partition: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Settings::default().session()
    }
}

/// Writes to a sibling tmp file, then renames over `path`.
pub(crate) fn write_json_atomic(path: &Path, json: &str) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&tmp_path, json)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.json"));
        assert_eq!(settings.zoom_factor, 1.0);
        assert!(settings.https_only);
        assert_eq!(settings.default_webview_state, WebviewState::Activated);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.zoom_factor = 1.5;
        settings.search_engine = SearchEngine::Brave;
        settings.useragent_override = Some("TestAgent/1.0".to_string());
        settings.save(&path).unwrap();

        assert!(!path.with_extension("tmp").exists());
        let loaded = Settings::load(&path);
        assert_eq!(loaded.zoom_factor, 1.5);
        assert_eq!(loaded.search_engine, SearchEngine::Brave);
        assert_eq!(loaded.useragent_override.as_deref(), Some("TestAgent/1.0"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "zoom_factor": 2.0 }"#).unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded.zoom_factor, 2.0);
        assert_eq!(loaded.search_engine, SearchEngine::DuckDuckGo);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path).zoom_factor, 1.0);
    }

    #[test]
    fn test_session_uses_shared_partition() {
        let session = Settings::default().session();
        assert_eq!(session.partition, DEFAULT_PARTITION);
        assert_eq!(session.useragent_override, None);
    }
}
