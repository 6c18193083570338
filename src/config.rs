//! App configuration persistence.
//! Remembers the last-used data file and row limit between sessions as JSON
//! in the platform config directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Default row cap for the CSV load, matching the dataset's practical size.
pub const DEFAULT_ROW_LIMIT: usize = 100_000;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: Option<PathBuf>,
    pub row_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

/// Manages the config directory and config file operations.
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing).
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a ConfigManager rooted at the platform config directory.
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("could not determine config directory")?
            .join(app_name);
        Ok(Self { config_dir })
    }

    fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Load the saved config; a missing or unreadable file yields the default.
    pub fn load(&self) -> AppConfig {
        let path = self.config_file();
        match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "ignoring malformed config");
                AppConfig::default()
            }),
            Err(_) => AppConfig::default(),
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)
            .with_context(|| format!("creating {}", self.config_dir.display()))?;
        let contents = serde_json::to_string_pretty(config)?;
        std::fs::write(self.config_file(), contents)
            .with_context(|| format!("writing {}", self.config_file().display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path().join("crashboard"));
        assert_eq!(manager.load(), AppConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path().join("crashboard"));

        let config = AppConfig {
            data_path: Some(PathBuf::from("/data/collisions.csv")),
            row_limit: 5000,
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load(), config);
    }

    #[test]
    fn malformed_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        std::fs::write(dir.path().join(CONFIG_FILE), "not json").unwrap();
        assert_eq!(manager.load(), AppConfig::default());
    }
}
