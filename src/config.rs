//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. Explicit path (if provided)
//! 2. `~/.vedrfolnir/config.toml` (user)
//! 3. `/etc/vedrfolnir/config.toml` (system)
//!
//! The API key may be left out of the file and supplied through
//! `OPENWEATHER_API_KEY` instead.
//!
//! ```toml
//! api_key = "..."
//! mode = "polling"
//! polling_interval_secs = 300
//!
//! [retry]
//! strategy = "exponential_backoff"
//! max_attempts = 3
//! initial_delay_ms = 500
//!
//! [cache]
//! max_entries = 100
//! ttl_secs = 600
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{DEFAULT_BASE_URL, WeatherClientBuilder};
use crate::fetch::{RetryConfig, RetryKind, RetryStrategy};
use crate::types::OperatingMode;
use crate::{CacheConfig, Result, VedrfolnirError};

/// Environment variable consulted when the file carries no API key.
pub const API_KEY_ENV_VAR: &str = "OPENWEATHER_API_KEY";

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub mode: OperatingMode,
    /// API root (default: `https://api.openweathermap.org/data/2.5`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Refresh interval in polling mode (default: 300, minimum 60).
    #[serde(default = "default_polling_interval")]
    pub polling_interval_secs: u64,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub cache: CacheSection,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            mode: OperatingMode::default(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            polling_interval_secs: default_polling_interval(),
            retry: RetrySection::default(),
            cache: CacheSection::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_polling_interval() -> u64 {
    300
}

/// `[retry]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    /// `"none"` (default) or `"exponential_backoff"`.
    #[serde(default)]
    pub strategy: RetryKind,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default)]
    pub max_delay_ms: Option<u64>,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            strategy: RetryKind::default(),
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: None,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

impl RetrySection {
    pub fn to_strategy(&self) -> RetryStrategy {
        let mut config = RetryConfig::new()
            .max_attempts(self.max_attempts)
            .initial_delay(Duration::from_millis(self.initial_delay_ms));
        if let Some(ms) = self.max_delay_ms {
            config = config.max_delay(Duration::from_millis(ms));
        }
        RetryStrategy::from_kind(self.strategy, config)
    }
}

/// `[cache]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_max_entries() -> usize {
    100
}

fn default_ttl_secs() -> u64 {
    600
}

impl CacheSection {
    pub fn to_config(&self) -> CacheConfig {
        CacheConfig::new()
            .max_entries(self.max_entries)
            .ttl(Duration::from_secs(self.ttl_secs))
    }
}

impl ClientConfig {
    /// Load configuration from the standard locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            VedrfolnirError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            VedrfolnirError::Configuration(msg) => {
                VedrfolnirError::Configuration(format!("{msg} ({path:?})"))
            }
            other => other,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            VedrfolnirError::Configuration(format!("Failed to parse config: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(VedrfolnirError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".vedrfolnir").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/vedrfolnir/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(VedrfolnirError::Configuration(
            "No config file found. Create ~/.vedrfolnir/config.toml or /etc/vedrfolnir/config.toml"
                .to_string(),
        ))
    }

    /// The API key from the file, falling back to [`API_KEY_ENV_VAR`].
    pub fn resolved_api_key(&self) -> Result<String> {
        resolve_api_key(self.api_key.as_deref(), std::env::var(API_KEY_ENV_VAR).ok())
    }

    /// Convert into a builder with every setting applied.
    pub fn into_builder(self) -> Result<WeatherClientBuilder> {
        let api_key = self.resolved_api_key()?;
        Ok(WeatherClientBuilder::new()
            .api_key(api_key)
            .mode(self.mode)
            .base_url(self.base_url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .polling_interval(Duration::from_secs(self.polling_interval_secs))
            .retry(self.retry.to_strategy())
            .cache(self.cache.to_config()))
    }
}

fn resolve_api_key(from_file: Option<&str>, from_env: Option<String>) -> Result<String> {
    let present = |key: &String| !key.trim().is_empty();
    from_file
        .map(str::to_string)
        .filter(present)
        .or_else(|| from_env.filter(present))
        .ok_or_else(|| {
            VedrfolnirError::InvalidValue(format!(
                "API key missing: set api_key in the config file or {API_KEY_ENV_VAR}"
            ))
        })
}
