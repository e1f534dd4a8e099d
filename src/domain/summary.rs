//! Aggregate risk exposure summary.

use rust_decimal::Decimal;
use serde::Serialize;

/// RiskSummary aggregates exposure across all open positions and relates it
/// to the configured maximum tolerable loss.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    /// Sum of per-position risk exposures.
    pub total_risk_exposure: Decimal,
    /// User-configured maximum tolerable loss, strictly positive.
    pub max_loss: Decimal,
    /// total / max_loss as a percentage, clamped to [0, 100] for display.
    pub utilization_percent: Decimal,
}
