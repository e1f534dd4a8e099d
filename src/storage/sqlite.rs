//! SQLite implementation of SettingsStore.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info};

use crate::storage::{Settings, SettingsStore, StorageError};

const KEY_API_KEY: &str = "bybit_api_key";
const KEY_API_SECRET: &str = "bybit_api_secret";
const KEY_MAX_LOSS: &str = "bybit_max_loss";
const KEY_ENVIRONMENT: &str = "bybit_environment";

/// SqliteSettingsStore implements SettingsStore using SQLite.
pub struct SqliteSettingsStore {
    pool: Pool<Sqlite>,
}

/// SqliteSettingsStoreConfig holds SQLite storage configuration.
#[derive(Debug, Clone)]
pub struct SqliteSettingsStoreConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
}

impl Default for SqliteSettingsStoreConfig {
    fn default() -> Self {
        Self {
            path: "settings.db".to_string(),
            max_connections: 1,
        }
    }
}

impl SqliteSettingsStore {
    /// Creates a new SQLite settings store.
    pub async fn new(config: SqliteSettingsStoreConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };

        store.migrate().await?;

        info!(path = %config.path, "SQLite settings store initialized");
        Ok(store)
    }

    /// Runs database migrations to create the schema.
    async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<String, _>(0)))
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        if settings.api_key.trim().is_empty() || settings.api_secret.trim().is_empty() {
            return Err(StorageError::InvalidData(
                "both API key and secret are required".to_string(),
            ));
        }

        self.put(KEY_API_KEY, &settings.api_key).await?;
        self.put(KEY_API_SECRET, &settings.api_secret).await?;
        self.put(KEY_MAX_LOSS, &settings.max_loss).await?;
        self.put(KEY_ENVIRONMENT, &settings.environment).await?;

        debug!("settings saved");
        Ok(())
    }

    async fn load(&self) -> Result<Option<Settings>, StorageError> {
        let api_key = self.get(KEY_API_KEY).await?;
        let api_secret = self.get(KEY_API_SECRET).await?;
        let max_loss = self.get(KEY_MAX_LOSS).await?;
        let environment = self.get(KEY_ENVIRONMENT).await?;

        if api_key.is_none() && api_secret.is_none() {
            return Ok(None);
        }

        Ok(Some(Settings {
            api_key: api_key.unwrap_or_default(),
            api_secret: api_secret.unwrap_or_default(),
            max_loss: max_loss.unwrap_or_default(),
            environment: environment.unwrap_or_default(),
        }))
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.pool.close().await;
        Ok(())
    }
}
