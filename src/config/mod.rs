use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    core::utils::{app_data_dir, config_file_in, ensure_dir, write_atomic},
    ledger::DEFAULT_LOOKBACK_MONTHS,
};

const MAX_LOOKBACK_MONTHS: u32 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Configuration is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lookback_months: u32,
    pub currency: String,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spending_limit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_scope: Option<Uuid>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
            currency: "BRL".into(),
            locale: "pt-BR".into(),
            spending_limit: None,
            active_scope: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_months > MAX_LOOKBACK_MONTHS {
            return Err(ConfigError::Invalid(format!(
                "lookback_months must be at most {}, got {}",
                MAX_LOOKBACK_MONTHS, self.lookback_months
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("currency must not be empty".into()));
        }
        Ok(())
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        let path = config_file_in(&base);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        Ok(Self { path })
    }

    /// Loads the stored configuration, or the defaults when none was saved.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.lookback_months, 36);
        assert_eq!(config.currency, "BRL");
    }

    #[test]
    fn save_then_load_keeps_values() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            lookback_months: 48,
            spending_limit: Some(Decimal::new(250_000, 2)),
            active_scope: Some(Uuid::new_v4()),
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert!(manager.path().ends_with("config/config.json"));
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "lookback_months": 12 }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.lookback_months, 12);
        assert_eq!(config.locale, "pt-BR");
    }

    #[test]
    fn oversized_lookback_is_rejected() {
        let config = Config {
            lookback_months: 10_000,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
