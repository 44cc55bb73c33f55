//! User settings.
//!
//! `$HOME/.contract-lens/settings.json` may hold an `env` map used as a
//! fallback for environment variables such as API keys.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings loaded from `$HOME/.contract-lens/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable fallbacks.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path. A missing file yields empty settings.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Settings>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        Ok(crate::config::app_dir()?.join("settings.json"))
    }

    /// Returns an environment variable, falling back to these settings.
    /// Empty values count as unset.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .or_else(|| self.env.get(key).cloned())
            .filter(|value| !value.trim().is_empty())
    }
}

/// Returns an environment variable with fallback to the settings file.
pub fn get_env_var(key: &str) -> Result<String> {
    if let Ok(value) = env::var(key) {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }

    let settings = Settings::load()
        .with_context(|| format!("Environment variable not found: {key}"))?;
    settings
        .get_env_var(key)
        .ok_or_else(|| anyhow::anyhow!("Environment variable not found: {}", key))
}

/// Returns the first of `keys` that is set, with fallback to the settings file.
pub fn get_env_vars(keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| get_env_var(key).ok())
        .ok_or_else(|| anyhow::anyhow!("None of the environment variables found: {:?}", keys))
}
