use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use serde::{Deserialize, Serialize};

use crate::reliability::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
use crate::services::ImportOptions;
use crate::spotify_rs::client::DEFAULT_API_BASE_URL;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The `Playlists` directory of an extracted Takeout archive
    #[serde(default)]
    takeout_directory: Option<String>,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub user_id: Option<String>,
    /// OAuth token with the `playlist-modify-private` scope
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub public_playlists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Retry failed searches with simplified artist/album/title
    #[serde(default = "default_true")]
    pub simplify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Pause between attempts, e.g. "5s" or "1m 30s"
    #[serde(default = "default_delay")]
    pub delay: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_delay() -> String {
    "5s".to_string()
}

fn default_request_timeout() -> String {
    "30s".to_string()
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            access_token: None,
            api_base_url: default_api_base_url(),
            public_playlists: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            simplify: default_true(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay: default_delay(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err(format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .wrap_err(format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("takeout-to-spotify").join("config.toml"))
    }

    /// Load the default config file, or the built-in defaults when it doesn't exist
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write the default config to the default path, unless a file is already there
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or(eyre!("No config directory found"))?;
        if path.exists() {
            log::info!("Config file already exists at {}", path.display());
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .wrap_err(format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Expand ~ to home directory
    fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }

    /// Get expanded Takeout playlists directory
    pub fn takeout_directory(&self) -> Option<PathBuf> {
        self.takeout_directory.as_deref().map(Self::expand_path)
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        if self.retry.max_attempts == 0 {
            return Err(eyre!("retry.max_attempts must be at least 1"));
        }

        Ok(RetryPolicy {
            max_attempts: self.retry.max_attempts,
            delay: parse_duration("retry.delay", &self.retry.delay)?,
        })
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        parse_duration("retry.request_timeout", &self.retry.request_timeout)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            simplify_search: self.search.simplify,
            public_playlists: self.spotify.public_playlists,
        }
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value).wrap_err(format!("Invalid duration for {}: {}", field, value))
}
