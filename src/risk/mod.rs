//! Risk exposure calculation for open positions.
//!
//! Exposure models the dollar loss realized if a position's stop-loss were
//! triggered from the current mark price. A stop on the favorable side of
//! mark price contributes zero, never a negative "gain": the monitor bounds
//! downside, it does not net P&L.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::domain::{AssessedPosition, Position, PositionSide, RiskSummary};

/// Risk calculation errors.
#[derive(Debug, Error)]
pub enum RiskError {
    /// The max-loss ceiling must be strictly positive; utilization is
    /// undefined otherwise.
    #[error("max loss must be positive, got {0}")]
    InvalidMaxLoss(Decimal),

    /// A numeric field from the exchange failed to parse as a decimal.
    #[error("malformed {field} value {value:?} for {symbol}")]
    MalformedData {
        symbol: String,
        field: &'static str,
        value: String,
    },
}

/// Result type for risk operations.
pub type Result<T> = std::result::Result<T, RiskError>;

/// Computes per-position and aggregate risk exposure.
pub struct RiskCalculator {
    max_loss: Decimal,
}

impl RiskCalculator {
    /// Creates a calculator for the given max-loss ceiling.
    ///
    /// Fails with [`RiskError::InvalidMaxLoss`] when the ceiling is zero or
    /// negative, so utilization never divides by zero.
    pub fn new(max_loss: Decimal) -> Result<Self> {
        if max_loss <= Decimal::ZERO {
            return Err(RiskError::InvalidMaxLoss(max_loss));
        }
        Ok(Self { max_loss })
    }

    /// Returns the configured max-loss ceiling.
    pub fn max_loss(&self) -> Decimal {
        self.max_loss
    }

    /// Computes the risk exposure of a single position.
    ///
    /// Buy:  max(0, (mark_price - stop_loss) * size)
    /// Sell: max(0, (stop_loss - mark_price) * size)
    pub fn exposure(&self, position: &Position) -> Result<Decimal> {
        let mark_price = parse_field(position, "mark_price", &position.mark_price)?;
        let stop_loss = parse_field(position, "stop_loss", &position.stop_loss)?;
        let size = parse_field(position, "size", &position.size)?;

        let raw = match position.side {
            PositionSide::Buy => (mark_price - stop_loss) * size,
            PositionSide::Sell => (stop_loss - mark_price) * size,
        };

        Ok(raw.max(Decimal::ZERO))
    }

    /// Assesses a list of open positions against the max-loss ceiling.
    ///
    /// Returns each position with its exposure attached, preserving input
    /// order, plus the aggregate summary. Utilization is clamped to
    /// [0, 100] even when total exposure exceeds the ceiling.
    pub fn assess(&self, positions: &[Position]) -> Result<(Vec<AssessedPosition>, RiskSummary)> {
        let mut assessed = Vec::with_capacity(positions.len());
        let mut total = Decimal::ZERO;

        for position in positions {
            let risk_exposure = self.exposure(position)?;
            total += risk_exposure;

            debug!(
                symbol = %position.symbol,
                side = %position.side,
                exposure = %risk_exposure,
                "position assessed"
            );

            assessed.push(AssessedPosition {
                position: position.clone(),
                risk_exposure,
            });
        }

        let hundred = Decimal::from(100);
        let utilization_percent = (total / self.max_loss * hundred).min(hundred);

        let summary = RiskSummary {
            total_risk_exposure: total,
            max_loss: self.max_loss,
            utilization_percent,
        };

        Ok((assessed, summary))
    }
}

fn parse_field(position: &Position, field: &'static str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|_| RiskError::MalformedData {
        symbol: position.symbol.clone(),
        field,
        value: value.to_string(),
    })
}
