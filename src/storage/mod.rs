//! Storage interfaces and implementations for persisting saved settings.

mod sqlite;

pub use sqlite::{SqliteSettingsStore, SqliteSettingsStoreConfig};

use async_trait::async_trait;

/// User settings persisted between sessions.
///
/// Secrets are stored as-is; no encryption is applied beyond whatever the
/// underlying storage provides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub api_secret: String,
    /// Max-loss ceiling as a decimal string.
    pub max_loss: String,
    /// Environment identifier ("testnet", "demo", "mainnet", "mainnet-alt").
    pub environment: String,
}

/// SettingsStore defines the interface for persisting user settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Save persists the settings, overwriting any previous values.
    async fn save(&self, settings: &Settings) -> Result<(), StorageError>;

    /// Load retrieves the saved settings, or `None` if nothing was saved yet.
    async fn load(&self) -> Result<Option<Settings>, StorageError>;

    /// Close closes the storage connection.
    async fn close(&self) -> Result<(), StorageError>;
}

/// StorageError represents errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
