use crate::config::{AppConfig, get_config_dir};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Config directory not found")]
    NoConfigDir,
}

/// Values to overwrite in the config file. `None` leaves a key untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigPatch {
    pub api_url: Option<String>,
    pub chat_path: Option<String>,
    pub posts_dir: Option<PathBuf>,
}

impl ConfigPatch {
    #[must_use]
    pub fn api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: Some(api_url.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.api_url.is_none() && self.chat_path.is_none() && self.posts_dir.is_none()
    }
}

pub struct ConfigPersister {
    config_path: PathBuf,
    write_lock: Mutex<()>,
}

impl ConfigPersister {
    #[must_use]
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_default_path() -> ConfigResult<Self> {
        get_config_dir()
            .map(|dir| Self::new(dir.join("config.toml")))
            .ok_or(ConfigError::NoConfigDir)
    }

    #[must_use]
    pub const fn path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn apply_patch(&self, patch: &ConfigPatch) -> ConfigResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let _lock = self.write_lock.lock();

        let existing = self.read_existing_config()?;

        let merged = Self::merge_config(existing, patch);

        self.atomic_write(&merged)
    }

    fn read_existing_config(&self) -> ConfigResult<AppConfig> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(AppConfig::default())
        }
    }

    fn merge_config(mut existing: AppConfig, patch: &ConfigPatch) -> AppConfig {
        if let Some(ref api_url) = patch.api_url {
            existing.api_url = Some(api_url.clone());
        }
        if let Some(ref chat_path) = patch.chat_path {
            existing.chat_path = Some(chat_path.clone());
        }
        if let Some(ref posts_dir) = patch.posts_dir {
            existing.posts_dir = Some(posts_dir.clone());
        }
        existing
    }

    fn atomic_write(&self, config: &AppConfig) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_content = toml::to_string_pretty(config)?;
        let content = format!(
            "# chatstream configuration\n\
             # This file is automatically managed by `chatstream config set`.\n\n\
             {toml_content}"
        );

        let temp_path = self.config_path.with_extension("toml.tmp");
        fs::write(&temp_path, &content)?;

        fs::rename(&temp_path, &self.config_path)?;
        tracing::debug!(path = %self.config_path.display(), "Config written");

        Ok(())
    }
}
