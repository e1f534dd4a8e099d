//! Settings persistence configuration.

use serde::Deserialize;

/// Local settings storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Whether saved settings should be persisted between sessions.
    #[serde(default)]
    pub enabled: bool,
    /// Path to the SQLite database file.
    pub path: Option<String>,
}
