//! Core business entities for open derivatives positions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// PositionSide represents the direction of a position (long or short).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionSide {
    /// Buy indicates a long position.
    Buy,
    /// Sell indicates a short position.
    Sell,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Buy => write!(f, "Buy"),
            PositionSide::Sell => write!(f, "Sell"),
        }
    }
}

/// Position represents an open derivatives position as reported by the
/// exchange, after field normalization.
///
/// Price and size fields stay in the exchange's decimal-string form until
/// the risk calculator parses them; a malformed string must surface as an
/// error there, not be silently coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Contract symbol (e.g., "BTCUSDT").
    pub symbol: String,
    /// Buy (long) or Sell (short).
    pub side: PositionSide,
    /// Position size in base units, decimal string, strictly positive.
    pub size: String,
    /// Average entry price, decimal string.
    pub entry_price: String,
    /// Current mark price, decimal string.
    pub mark_price: String,
    /// Unrealized profit and loss, decimal string.
    pub unrealized_pnl: String,
    /// Stop-loss price, decimal string; "0.00" when no stop is set.
    pub stop_loss: String,
    /// Leverage multiplier, decimal string.
    pub leverage: String,
    /// Notional value of the position, decimal string.
    pub position_value: String,
}

/// AssessedPosition is a Position with its computed risk exposure attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessedPosition {
    /// The underlying open position.
    #[serde(flatten)]
    pub position: Position,
    /// Modeled dollar loss if the stop-loss is hit from mark price.
    /// Never negative: a stop already past mark price contributes zero.
    pub risk_exposure: Decimal,
}
