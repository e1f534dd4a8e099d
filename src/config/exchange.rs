//! Exchange configuration.

use serde::Deserialize;

/// Settings for the Bybit connection.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Target environment: "testnet", "demo", "mainnet", or "mainnet-alt".
    /// Unrecognized values fall back to testnet.
    pub environment: Option<String>,
    /// API key (loaded from environment variable).
    #[serde(skip)]
    pub api_key: String,
    /// API secret (loaded from environment variable).
    #[serde(skip)]
    pub api_secret: String,
}
