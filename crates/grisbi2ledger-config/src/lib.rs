//! Configuration management for grisbi2ledger
//!
//! This module handles loading, validation, and defaults of the
//! conversion settings from YAML files.

pub mod error;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use error::{ConfigError, ConfigErrorCode, ConfigResult};

// ==================== Configuration Types ====================

/// Output journal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Account balancing the opening-balance transaction
    #[serde(default = "default_opening_balance_account")]
    pub opening_balance_account: String,
    /// Payee of the opening-balance transaction
    #[serde(default = "default_opening_balance_payee")]
    pub opening_balance_payee: String,
    /// Opening-balance date when the input has no transactions
    #[serde(default = "default_fallback_opening_date")]
    pub fallback_opening_date: NaiveDate,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            opening_balance_account: default_opening_balance_account(),
            opening_balance_payee: default_opening_balance_payee(),
            fallback_opening_date: default_fallback_opening_date(),
        }
    }
}

fn default_opening_balance_account() -> String {
    "Equity:Opening Balance".to_string()
}

fn default_opening_balance_payee() -> String {
    "Opening Balance".to_string()
}

fn default_fallback_opening_date() -> NaiveDate {
    NaiveDate::default()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Journal output settings
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        let account = &self.ledger.opening_balance_account;
        if account.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ledger.opening_balance_account".to_string(),
                reason: "Account name must not be empty".to_string(),
            });
        }
        let mut components = account.split(':');
        if components.next() != Some("Equity") || components.any(|c| c.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "ledger.opening_balance_account".to_string(),
                reason: "Account must be a non-empty path below Equity, e.g. Equity:Opening Balance".to_string(),
            });
        }

        if self.ledger.opening_balance_payee.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ledger.opening_balance_payee".to_string(),
                reason: "Payee must not be empty".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// The default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}
