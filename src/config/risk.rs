//! Risk ceiling configuration.

use serde::Deserialize;

/// Risk exposure settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Maximum tolerable loss in settlement currency as a decimal string
    /// (e.g., "1000"). Must be strictly positive.
    pub max_loss: String,
}
