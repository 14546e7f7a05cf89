use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;

/// Environment variable that overrides the roster base URL
pub const ROSTER_URL_ENV: &str = "LOCO_ROSTER_URL";

const APP_DIR: &str = "loco-roster";

/// Persistent application settings (settings.json)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Folder the roster was last opened from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_folder: Option<PathBuf>,
    /// Base URL of a served roster (the app root, e.g. "http://jmri.local:12080/")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster_url: Option<String>,
    /// Name of the current offline cache generation
    #[serde(default = "default_cache_version")]
    pub cache_version: String,
    /// Assets pre-fetched when a cache generation is installed
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,
}

fn default_cache_version() -> String {
    "jmri-roster-browser-v1".to_string()
}

fn default_assets() -> Vec<String> {
    [
        "./",
        "./index.html",
        "./style.css",
        "./app.js",
        "./manifest.json",
        "./icon-192.png",
        "./roster/roster.xml",
        "https://unpkg.com/dexie/dist/dexie.js",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            last_folder: None,
            roster_url: None,
            cache_version: default_cache_version(),
            assets: default_assets(),
        }
    }
}

impl Settings {
    /// Load settings from the user data directory, applying env overrides
    pub fn load() -> Self {
        Self::load_from(&settings_path()).with_env_override(std::env::var(ROSTER_URL_ENV).ok())
    }

    /// Load from a specific file; a missing or unreadable file gives defaults
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                debug!("No settings at {}, using defaults", path.display());
                return Settings::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("⚠️  Ignoring unreadable settings {}: {}", path.display(), e);
            Settings::default()
        })
    }

    pub fn with_env_override(mut self, roster_url: Option<String>) -> Self {
        if let Some(url) = roster_url.filter(|u| !u.trim().is_empty()) {
            self.roster_url = Some(url);
        }
        self
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Application data directory
/// - Linux: ~/.local/share/loco-roster
/// - macOS: ~/Library/Application Support/loco-roster
/// - Windows: %APPDATA%\loco-roster
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

/// Root of the offline response caches (~/.cache/loco-roster/offline on Linux)
pub fn offline_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("offline")
}

fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}
