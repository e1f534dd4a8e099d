//! Configuration loading and validation for the risk monitor.
//!
//! Uses serde_yaml to load YAML configuration files with support for
//! environment variable overrides for sensitive credentials.

mod app;
mod error;
mod exchange;
mod risk;
mod storage;

pub use app::AppConfig;
pub use error::ConfigError;
pub use exchange::ExchangeConfig;
pub use risk::RiskConfig;
pub use storage::StorageConfig;

use std::str::FromStr;
use std::{env, fs};

use rust_decimal::Decimal;
use serde::Deserialize;

/// Root configuration structure for the risk monitor.
///
/// Required sections: app, exchange, risk. Optional: storage.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application-level settings like name and environment.
    pub app: AppConfig,
    /// Bybit connection settings.
    pub exchange: ExchangeConfig,
    /// Risk ceiling settings.
    pub risk: RiskConfig,
    /// Saved-settings persistence (optional).
    pub storage: Option<StorageConfig>,
}

impl Config {
    /// Load configuration from a YAML file at the given path.
    ///
    /// First loads environment variables from `.env` file (if exists),
    /// then loads YAML config and credentials from environment variables
    /// `BYBIT_API_KEY` and `BYBIT_API_SECRET`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore error if not found)
        dotenvy::dotenv().ok();

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        config.load_credentials_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load credentials from environment variables.
    fn load_credentials_from_env(&mut self) {
        self.exchange.api_key = env::var("BYBIT_API_KEY").unwrap_or_default();
        self.exchange.api_secret = env::var("BYBIT_API_SECRET").unwrap_or_default();
    }

    /// Parses the configured max-loss ceiling.
    pub fn max_loss(&self) -> Result<Decimal, ConfigError> {
        Decimal::from_str(&self.risk.max_loss)
            .map_err(|_| ConfigError::InvalidMaxLoss(self.risk.max_loss.clone()))
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.is_empty() {
            return Err(ConfigError::Validation("app.name is required".into()));
        }

        let max_loss = self.max_loss()?;
        if max_loss <= Decimal::ZERO {
            return Err(ConfigError::Validation(
                "risk.max_loss must be positive".into(),
            ));
        }

        // Only require credentials in production/staging
        let is_production = self.app.env != "development";
        if is_production
            && (self.exchange.api_key.is_empty() || self.exchange.api_secret.is_empty())
        {
            return Err(ConfigError::Validation(
                "API credentials not found (set BYBIT_API_KEY and BYBIT_API_SECRET env vars)"
                    .into(),
            ));
        }

        if let Some(ref storage) = self.storage {
            if storage.enabled && storage.path.as_deref().unwrap_or("").is_empty() {
                return Err(ConfigError::Validation(
                    "storage.path is required when storage is enabled".into(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
