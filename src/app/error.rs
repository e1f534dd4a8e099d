//! Monitor error types.

/// Monitor error type.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("config error: {0}")]
    Config(String),
    #[error("exchange error: {0}")]
    Exchange(#[from] crate::exchange::ExchangeError),
    #[error("risk error: {0}")]
    Risk(#[from] crate::risk::RiskError),
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
    #[error("storage is not enabled")]
    StorageDisabled,
}
