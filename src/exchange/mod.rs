//! Exchange integration abstractions and implementations.

pub mod bybit;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Position;

/// Exchange errors.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Network-level failure before a response was obtained.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status from the exchange.
    #[error("http error: {0}")]
    Http(String),

    /// Application-level error in the response envelope.
    #[error("API error {code}: {message}")]
    Api { code: i32, message: String },

    /// Response body did not match the expected envelope.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type for exchange operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// PositionSource defines the interface for fetching open positions from an
/// exchange.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Fetches all open positions, already filtered and normalized.
    /// Closed or flat positions (size not strictly positive) are excluded;
    /// exchange ordering is preserved.
    async fn open_positions(&self) -> Result<Vec<Position>>;

    /// Name returns the unique identifier of this exchange (e.g., "bybit").
    fn name(&self) -> &str;
}
