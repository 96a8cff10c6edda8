use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::Result;

pub const CONFIG_FILE: &str = "resell_tracker.json";

/// Application settings, read from `resell_tracker.json` next to the binary's
/// working directory. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub recent_capacity: usize,
    pub top_count: usize,
    pub log_level: String,
    pub seed_demo_account: bool,
    pub dark_theme: bool,
    /// Unsplash access key. Without one, pictures come from the built-in rules only.
    pub unsplash_access_key: Option<String>,
    pub image_api_url: String,
    pub image_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: PathBuf::from("resell_tracker.db"),
            recent_capacity: 5,
            top_count: 5,
            log_level: "info".to_string(),
            seed_demo_account: true,
            dark_theme: false,
            unsplash_access_key: None,
            image_api_url: crate::images::UNSPLASH_RANDOM_URL.to_string(),
            image_timeout_ms: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Defaults, then the config file if present, then environment overrides.
    pub fn load(path: &Path) -> Self {
        let mut config = if path.exists() {
            Self::from_file(path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                Self::default()
            })
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(db) = var("RESELL_TRACKER_DB").filter(|v| !v.is_empty()) {
            self.db_path = PathBuf::from(db);
        }
        if let Some(level) = var("RESELL_TRACKER_LOG").filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
        if let Some(key) = var("RESELL_TRACKER_UNSPLASH_KEY").filter(|v| !v.is_empty()) {
            self.unsplash_access_key = Some(key);
        }
        if self.recent_capacity == 0 {
            self.recent_capacity = 1;
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
