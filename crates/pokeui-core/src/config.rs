//! Persistent configuration for pokeui.
//!
//! Stores engine settings in `~/.pokeui/config.json`. Every field has a
//! default, so a missing file, or one naming only some fields, is fine.
//!
//! # Example
//!
//! ```no_run
//! use pokeui_core::config::EngineConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = EngineConfig::load();
//! println!("navigation timeout: {}ms", config.navigation_timeout_ms);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::label::AreaPolicy;

const CONFIG_FILENAME: &str = "config.json";

/// Returns the pokeui settings directory (`~/.pokeui`).
///
/// Falls back to the system temp directory when no home directory is known.
pub fn pokeui_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".pokeui")
}

fn default_navigation_timeout_ms() -> u64 {
    5000
}

fn default_journal_limit() -> usize {
    1000
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Which ancestor owns a text block for `area` queries.
    #[serde(default)]
    pub area_policy: AreaPolicy,

    /// How long `after_load` waits for a navigation to complete.
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Pause after each typed character; zero only yields to the scheduler.
    #[serde(default)]
    pub keystroke_delay_ms: u64,

    /// Maximum journal entries a `Ui` keeps; zero disables the journal.
    #[serde(default = "default_journal_limit")]
    pub journal_limit: usize,

    /// Directory for JSON Lines run-event logs. No log is written when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            area_policy: AreaPolicy::default(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            keystroke_delay_ms: 0,
            journal_limit: default_journal_limit(),
            log_dir: None,
        }
    }
}

impl EngineConfig {
    /// Load config from `~/.pokeui/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(pokeui_dir().join(CONFIG_FILENAME)).unwrap_or_default()
    }

    /// Load config from an explicit path, reporting why it could not be read.
    pub fn load_from(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Save config to `~/.pokeui/config.json`.
    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(pokeui_dir().join(CONFIG_FILENAME))
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }

    /// The navigation timeout as a [`Duration`].
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// The keystroke delay as a [`Duration`].
    pub fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(self.keystroke_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = EngineConfig::default();
        assert_eq!(config.area_policy, AreaPolicy::InnermostFirst);
        assert_eq!(config.navigation_timeout_ms, 5000);
        assert_eq!(config.keystroke_delay_ms, 0);
        assert_eq!(config.journal_limit, 1000);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn deserialize_partial_json() {
        let loaded: EngineConfig =
            serde_json::from_str(r#"{"area_policy": "named_first", "navigation_timeout_ms": 250}"#).unwrap();
        assert_eq!(loaded.area_policy, AreaPolicy::NamedFirst);
        assert_eq!(loaded.navigation_timeout(), Duration::from_millis(250));
        assert_eq!(loaded.journal_limit, 1000);
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = EngineConfig {
            keystroke_delay_ms: 5,
            log_dir: Some(dir.path().join("logs")),
            ..EngineConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(EngineConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn load_from_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = EngineConfig::load_from(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn load_returns_default_for_missing_file() {
        // Must not panic whether or not a real config file exists.
        let _ = EngineConfig::load();
    }
}
