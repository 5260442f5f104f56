//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! backend URL, last used username, where the session is persisted and the
//! inactivity window.
//!
//! Configuration is stored at `~/.config/greenid/config.json`. Environment
//! variables override the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;
use crate::auth::{FileStorage, KeyringStorage, MemoryStorage, SessionStorage, INACTIVITY_TIMEOUT};

/// Application name used for config/data directory paths
const APP_NAME: &str = "greenid";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Overrides `api_base_url`
pub const API_URL_ENV: &str = "GREENID_API_URL";

/// Where the session survives between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    /// Not persisted at all
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub last_username: Option<String>,
    pub storage: StorageBackend,
    pub inactivity_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            last_username: None,
            storage: StorageBackend::default(),
            inactivity_minutes: INACTIVITY_TIMEOUT.as_secs() / 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config")?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the session file and logs.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Zero falls back to the default window.
    pub fn inactivity_timeout(&self) -> Duration {
        if self.inactivity_minutes == 0 {
            INACTIVITY_TIMEOUT
        } else {
            Duration::from_secs(self.inactivity_minutes * 60)
        }
    }

    /// Open the configured session storage backend.
    pub fn open_storage(&self) -> Result<Box<dyn SessionStorage>> {
        Ok(match self.storage {
            StorageBackend::File => Box::new(FileStorage::open(self.data_dir()?)?),
            StorageBackend::Keyring => Box::new(KeyringStorage::new()),
            StorageBackend::Memory => Box::new(MemoryStorage::new()),
        })
    }
}
