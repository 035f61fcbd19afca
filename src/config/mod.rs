pub mod persistence;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use std::{fs, io};

pub use persistence::{ConfigError, ConfigPatch, ConfigPersister, ConfigResult};

use crate::blog::DEFAULT_POSTS_DIR;
use crate::transport::http::{DEFAULT_BASE_URL, DEFAULT_CHAT_PATH};
use crate::transport::{AuthStrategy, HttpConfig, HttpTransport};

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join("Library/Application Support/chatstream"))
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|c| c.join("chatstream"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|a| a.join("chatstream"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join(".config/chatstream"))
    }
}

/// Settings read from `config.toml` and `CHATSTREAM_*` variables.
///
/// Every key is optional; the accessors fill in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts_dir: Option<PathBuf>,
}

impl AppConfig {
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(Self::get_config_path())
    }

    #[must_use]
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("CHATSTREAM"));

        builder
            .build()
            .and_then(Config::try_deserialize)
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config: {e}");
                Self::default()
            })
    }

    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        get_config_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn init_default() -> Result<PathBuf, io::Error> {
        let path = Self::get_config_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {}", path.display()),
            ));
        }

        fs::write(&path, include_str!("config.template.toml"))?;
        Ok(path)
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    #[must_use]
    pub fn chat_path(&self) -> &str {
        self.chat_path
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_CHAT_PATH)
    }

    #[must_use]
    pub fn posts_dir(&self) -> PathBuf {
        self.posts_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_POSTS_DIR))
    }

    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        let mut http = HttpConfig::default();
        if let Some(secs) = self.connect_timeout_secs {
            http = http.with_connect_timeout(Duration::from_secs(secs));
        }
        if let Some(retries) = self.max_retries {
            http = http.with_max_retries(retries);
        }
        http
    }

    /// Builds the HTTP transport described by this configuration.
    pub fn transport(&self) -> Result<HttpTransport, crate::stream::StreamError> {
        Ok(HttpTransport::with_http_config(self.http_config())?
            .with_base_url(self.api_url())
            .with_chat_path(self.chat_path())
            .with_auth(AuthStrategy::from_optional(self.api_token.as_deref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::default();
        assert_eq!(config.api_url(), "http://localhost:5000/api/v1");
        assert_eq!(config.chat_path(), "/ai-chat/chat");
        assert_eq!(config.posts_dir(), PathBuf::from("content/posts"));
        assert_eq!(config.http_config().max_retries, 0);
    }

    #[test]
    fn load_reads_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "api_url = \"https://example.test/api\"\nmax_retries = 2\nposts_dir = \"posts\"\n",
        )
        .expect("Failed to write config");

        let config = AppConfig::load_from(Some(path));
        assert_eq!(config.api_url(), "https://example.test/api");
        assert_eq!(config.chat_path(), "/ai-chat/chat");
        assert_eq!(config.posts_dir(), PathBuf::from("posts"));
        assert_eq!(config.http_config().max_retries, 2);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = AppConfig {
            api_url: Some("  ".into()),
            ..AppConfig::default()
        };
        assert_eq!(config.api_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn template_parses() {
        let config: AppConfig =
            toml::from_str(include_str!("config.template.toml")).expect("template parses");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn transport_uses_configured_endpoint() {
        let config = AppConfig {
            api_url: Some("https://example.test/api/".into()),
            chat_path: Some("chat".into()),
            ..AppConfig::default()
        };
        let transport = config.transport().expect("client builds");
        assert_eq!(transport.endpoint(), "https://example.test/api/chat");
        assert!(format!("{transport:?}").contains("auth: None"));
    }

    #[test]
    fn api_token_becomes_bearer_auth() {
        let config = AppConfig {
            api_token: Some("session-token".into()),
            ..AppConfig::default()
        };
        let debug = format!("{:?}", config.transport().expect("client builds"));
        assert!(debug.contains("Bearer"));
        assert!(!debug.contains("session-token"));
    }
}
