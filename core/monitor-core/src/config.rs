//! Monitor configuration.
//!
//! Loaded once at startup and handed to the monitor as an immutable value.
//! The file format follows the extension: YAML (`.yaml`/`.yml`) or TOML.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use crate::error::{ConfigError, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_COOLDOWN_MINUTES: u64 = 10;
const DEFAULT_PRE_DISPATCH_DELAY_SECS: u64 = 10;
const MAX_COOLDOWN_MINUTES: u64 = (i64::MAX / 60_000) as u64;
// One year.
const MAX_POLL_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MessageConfig {
    pub sender: String,
    pub text: String,
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: u64,
    #[serde(default)]
    pub ignored_users: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MonitoringConfig {
    pub poll_interval_seconds: u64,
    #[serde(default = "default_true")]
    pub baseline_on_startup: bool,
    #[serde(default = "default_pre_dispatch_delay_seconds")]
    pub pre_dispatch_delay_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MonitorConfig {
    pub api: ApiConfig,
    pub message: MessageConfig,
    pub monitoring: MonitoringConfig,
}

impl MonitorConfig {
    pub fn cooldown_window(&self) -> chrono::Duration {
        i64::try_from(self.message.cooldown_minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn poll_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.monitoring.poll_interval_seconds)
    }

    pub fn pre_dispatch_delay(&self) -> StdDuration {
        StdDuration::from_secs(self.monitoring.pre_dispatch_delay_seconds)
    }

    pub fn request_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.api.timeout_seconds)
    }

    fn normalize(mut self) -> Self {
        let trimmed = self.api.base_url.trim().trim_end_matches('/').to_string();
        self.api.base_url = trimmed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.as_str();
        if base_url.is_empty() {
            return Err(invalid("api.base_url", "must not be empty"));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(invalid("api.base_url", "must start with http:// or https://"));
        }
        if self.api.timeout_seconds == 0 {
            return Err(invalid("api.timeout_seconds", "must be greater than zero"));
        }
        if self.message.sender.trim().is_empty() {
            return Err(invalid("message.sender", "must not be empty"));
        }
        if self.message.text.trim().is_empty() {
            return Err(invalid("message.text", "must not be empty"));
        }
        if self.message.cooldown_minutes > MAX_COOLDOWN_MINUTES {
            return Err(invalid("message.cooldown_minutes", "is too large"));
        }
        if self.monitoring.poll_interval_seconds == 0 {
            return Err(invalid(
                "monitoring.poll_interval_seconds",
                "must be greater than zero",
            ));
        }
        if self.monitoring.poll_interval_seconds > MAX_POLL_INTERVAL_SECS {
            return Err(invalid("monitoring.poll_interval_seconds", "is too large"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("toml") => Some(Self::Toml),
            _ => None,
        }
    }
}

pub fn load_config(path: &Path) -> Result<MonitorConfig> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    let content = fs_err::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, format, path)
}

pub fn parse_config(content: &str, format: ConfigFormat, path: &Path) -> Result<MonitorConfig> {
    let parsed: MonitorConfig = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|err| malformed(path, err))?,
        ConfigFormat::Toml => toml::from_str(content).map_err(|err| malformed(path, err))?,
    };
    let config = parsed.normalize();
    config.validate()?;
    Ok(config)
}

fn malformed(path: &Path, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Malformed {
        path: PathBuf::from(path),
        details: err.to_string(),
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_cooldown_minutes() -> u64 {
    DEFAULT_COOLDOWN_MINUTES
}

fn default_pre_dispatch_delay_seconds() -> u64 {
    DEFAULT_PRE_DISPATCH_DELAY_SECS
}

fn default_true() -> bool {
    true
}
