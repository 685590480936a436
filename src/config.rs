//! Application configuration.
//!
//! Values resolve with priority: config.toml > environment (.env) > defaults.
//! The formula constants themselves live in [`crate::srs::params`]; this
//! module only decides which of them a deployment runs with.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::paths;
use crate::srs::params::{
    FormulaVersion, Weights, DEFAULT_DESIRED_RETENTION, DEFAULT_MAXIMUM_INTERVAL,
    MAX_DESIRED_RETENTION, MIN_DESIRED_RETENTION,
};

// ==================== File Structure ====================

/// Configuration file structure for config.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub scheduler: SchedulerConfig,
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SERVER_ADDR.to_string(),
            port: SERVER_PORT,
        }
    }
}

impl ServerConfig {
    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

// ==================== Scheduler Configuration ====================

/// Tunables of the memory scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Recall probability the interval formula targets
    pub desired_retention: f64,
    /// Longest interval ever scheduled, in days
    pub maximum_interval_days: u32,
    /// Formula used for items reviewed for the first time
    pub default_version: FormulaVersion,
    pub weights: Weights,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            desired_retention: DEFAULT_DESIRED_RETENTION,
            maximum_interval_days: DEFAULT_MAXIMUM_INTERVAL,
            default_version: FormulaVersion::default(),
            weights: Weights::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_DESIRED_RETENTION..=MAX_DESIRED_RETENTION).contains(&self.desired_retention) {
            return Err(ConfigError::Invalid {
                field: "desired_retention",
                reason: format!(
                    "{} is outside {}..={}",
                    self.desired_retention, MIN_DESIRED_RETENTION, MAX_DESIRED_RETENTION
                ),
            });
        }
        if self.maximum_interval_days == 0 {
            return Err(ConfigError::Invalid {
                field: "maximum_interval_days",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(version) = self.weights.first_non_finite() {
            return Err(ConfigError::Invalid {
                field: "weights",
                reason: format!("{} table contains a non-finite weight", version),
            });
        }
        Ok(())
    }
}

// ==================== Loading ====================

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.scheduler.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Apply environment overrides. Unparseable or out-of-range values are
    /// logged and skipped.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SRS_DESIRED_RETENTION") {
            match raw.parse::<f64>() {
                Ok(r) if (MIN_DESIRED_RETENTION..=MAX_DESIRED_RETENTION).contains(&r) => {
                    self.scheduler.desired_retention = r;
                }
                _ => tracing::warn!("Ignoring SRS_DESIRED_RETENTION={}", raw),
            }
        }

        if let Some(raw) = lookup("SRS_MAXIMUM_INTERVAL") {
            match raw.parse::<u32>() {
                Ok(days) if days >= 1 => self.scheduler.maximum_interval_days = days,
                _ => tracing::warn!("Ignoring SRS_MAXIMUM_INTERVAL={}", raw),
            }
        }

        if let Some(raw) = lookup("SRS_DEFAULT_VERSION") {
            match raw.trim().parse::<FormulaVersion>() {
                Ok(version) => self.scheduler.default_version = version,
                Err(e) => tracing::warn!("Ignoring SRS_DEFAULT_VERSION: {}", e),
            }
        }

        if let Some(raw) = lookup("PORT") {
            match raw.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring PORT={}", raw),
            }
        }
    }
}

/// Load configuration with priority: config.toml > .env/environment > default
pub fn load() -> AppConfig {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Priority 1: config.toml
    let path = paths::config_path();
    if path.exists() {
        match AppConfig::load_from(&path) {
            Ok(config) => {
                tracing::info!("Using config from {}", path.display());
                return config;
            }
            Err(e) => tracing::warn!("Ignoring {}: {}", path.display(), e),
        }
    }

    // Priority 2: environment, on top of defaults
    let mut config = AppConfig::default();
    config.apply_env(|key| std::env::var(key).ok());
    tracing::info!(
        "Using scheduler defaults: retention {}, max interval {}d, version {}",
        config.scheduler.desired_retention,
        config.scheduler.maximum_interval_days,
        config.scheduler.default_version
    );
    config
}
