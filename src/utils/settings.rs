//! Settings and configuration utilities.
//!
//! This module reads settings from `$HOME/.agri-advisor/settings.json` and
//! uses them as a fallback for environment variables. The path can be
//! overridden with `AGRI_ADVISOR_SETTINGS`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable that points at an alternative settings file.
pub const SETTINGS_PATH_VAR: &str = "AGRI_ADVISOR_SETTINGS";

/// Settings loaded from `$HOME/.agri-advisor/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable fallbacks.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    ///
    /// A missing file yields empty settings; a malformed one is an error.
    pub fn load() -> Result<Self> {
        match Self::get_settings_path() {
            Some(path) => Self::load_from_path(path),
            None => {
                tracing::debug!("No home directory; skipping settings file");
                Ok(Self::default())
            }
        }
    }

    /// Loads settings from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings = serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            keys = settings.env.len(),
            "Loaded settings file"
        );
        Ok(settings)
    }

    /// Returns the settings path, honouring `AGRI_ADVISOR_SETTINGS`.
    pub fn get_settings_path() -> Option<PathBuf> {
        if let Ok(path) = env::var(SETTINGS_PATH_VAR) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".agri-advisor").join("settings.json"))
    }

    /// Returns an environment variable with fallback to settings.
    ///
    /// A variable set to an empty or whitespace-only value counts as unset.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.env.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn settings_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join("settings.json");

        let settings_json = r#"{
            "env": {
                "AGRI_PROVIDER": "gemini",
                "GOOGLE_API_KEY": "test_api_key"
            }
        }"#;
        fs::write(&settings_path, settings_json).unwrap();

        let settings = Settings::load_from_path(&settings_path).unwrap();

        assert_eq!(settings.env.get("AGRI_PROVIDER").unwrap(), "gemini");
        assert_eq!(settings.env.get("GOOGLE_API_KEY").unwrap(), "test_api_key");
    }

    #[test]
    fn missing_file_yields_empty_settings() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from_path(temp_dir.path().join("absent.json")).unwrap();
        assert!(settings.env.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join("settings.json");
        fs::write(&settings_path, "{ not json").unwrap();

        let err = Settings::load_from_path(&settings_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings file"));
    }

    #[test]
    fn settings_fall_back_when_env_unset() {
        let settings = Settings {
            env: HashMap::from([(
                "AGRI_TEST_ONLY_IN_SETTINGS".to_string(),
                "from_settings".to_string(),
            )]),
        };

        assert_eq!(
            settings.get_env_var("AGRI_TEST_ONLY_IN_SETTINGS").as_deref(),
            Some("from_settings")
        );
        assert_eq!(settings.get_env_var("AGRI_TEST_NOWHERE"), None);
    }

    #[test]
    fn blank_env_var_falls_back_to_settings() {
        let key = "AGRI_TEST_BLANK_IN_ENV";
        env::set_var(key, "");
        let settings = Settings {
            env: HashMap::from([(key.to_string(), "sk-from-settings".to_string())]),
        };

        let value = settings.get_env_var(key);
        env::remove_var(key);
        assert_eq!(value.as_deref(), Some("sk-from-settings"));
    }
}
