//! Runtime configuration.
//!
//! Values are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file: `--config <path>` or `<config_dir>/codescope/config.toml`
//! 3. Environment: `CODESCOPE_API_KEY` / `ANTHROPIC_API_KEY`, `CODESCOPE_API_URL`
//! 4. Command-line flags (applied by the CLI)
//!
//! The API credential is only ever read from these sources; nothing in the
//! crate carries a built-in key.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::{get_config_dir, get_data_dir, get_default_export_dir};

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONFIG_FILENAME: &str = "config.toml";
const HISTORY_FILENAME: &str = "codescope_history.json";

const API_KEY_VARS: [&str; 2] = ["CODESCOPE_API_KEY", "ANTHROPIC_API_KEY"];
const API_URL_VAR: &str = "CODESCOPE_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// HTML page scanned for code when nothing is selected
    pub page: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub history_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page: None,
            export_dir: None,
            history_path: None,
        }
    }
}

// Keep the credential out of logs and panic messages
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("page", &self.page)
            .field("export_dir", &self.export_dir)
            .field("history_path", &self.history_path)
            .finish()
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn load_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::load_str(&content)
    }

    /// Load the explicit file if given (it must exist), else the default file if present
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) =
            API_KEY_VARS.iter().filter_map(|name| lookup(name)).find(|v| !v.trim().is_empty())
        {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_url must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be greater than 0".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Non-blank API key, if any
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }

    /// Location of the persisted history entry
    pub fn history_file(&self) -> anyhow::Result<PathBuf> {
        match &self.history_path {
            Some(path) => Ok(path.clone()),
            None => Ok(get_data_dir()?.join(HISTORY_FILENAME)),
        }
    }

    pub fn export_directory(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(get_default_export_dir)
    }
}

/// `<config_dir>/codescope/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    get_config_dir().ok().map(|dir| dir.join(CONFIG_FILENAME))
}
