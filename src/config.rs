// Configuration management for the currency trader

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::ledger::money::{has_money_precision, MIN_RATE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub rate: Decimal,               // Domestic units per one foreign unit
    pub delta: Decimal,              // Maximum one-sided drift per advance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,           // Fixed seed for reproducible drift
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub domestic: Decimal,
    pub foreign: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_domestic_code")]
    pub domestic: String,
    #[serde(default = "default_foreign_code")]
    pub foreign: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_audit_log")]
    pub audit_log: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub market: MarketConfig,
    pub balances: BalanceConfig,
    #[serde(default)]
    pub currencies: CurrencyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

// Default value functions
fn default_domestic_code() -> String { "UAH".to_string() }
fn default_foreign_code() -> String { "USD".to_string() }
fn default_state_file() -> PathBuf { PathBuf::from("state.json") }
fn default_audit_log() -> PathBuf { PathBuf::from("state_log.jsonl") }

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            domestic: default_domestic_code(),
            foreign: default_foreign_code(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            audit_log: default_audit_log(),
        }
    }
}

impl Config {
    /// Sample configuration written by `trader init`
    pub fn example() -> Self {
        Self {
            market: MarketConfig {
                rate: Decimal::new(2700, 2),
                delta: Decimal::new(50, 2),
                seed: None,
            },
            balances: BalanceConfig {
                domestic: Decimal::new(100000, 2),
                foreign: Decimal::new(0, 2),
            },
            currencies: CurrencyConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    /// Load configuration from a TOML file, or JSON when the extension is `.json`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
            _ => ConfigError::FileRead(format!("{}: {}", path.display(), e)),
        })?;

        if is_json(path) {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration, using the same format rules as `from_file`
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            toml::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        };

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.market.rate < MIN_RATE {
            return Err(ConfigError::Validation(format!("rate must be at least {}", MIN_RATE)));
        }

        if self.market.delta.is_sign_negative() {
            return Err(ConfigError::Validation("delta must be non-negative".to_string()));
        }

        if self.balances.domestic.is_sign_negative() || self.balances.foreign.is_sign_negative() {
            return Err(ConfigError::Validation("initial balances must be non-negative".to_string()));
        }

        let precise = [
            ("rate", self.market.rate),
            ("delta", self.market.delta),
            ("balances.domestic", self.balances.domestic),
            ("balances.foreign", self.balances.foreign),
        ];
        for (name, value) in precise {
            if !has_money_precision(value) {
                return Err(ConfigError::Validation(format!(
                    "{} must have at most 2 decimal places, got {}",
                    name, value
                )));
            }
        }

        if self.currencies.domestic.trim().is_empty() || self.currencies.foreign.trim().is_empty() {
            return Err(ConfigError::Validation("currency codes must not be empty".to_string()));
        }

        if self.currencies.domestic == self.currencies.foreign {
            return Err(ConfigError::Validation("currency codes must differ".to_string()));
        }

        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
