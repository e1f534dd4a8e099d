//! Risk monitor application layer.
//!
//! Coordinates the exchange client, risk calculator, and settings store
//! behind discrete handler methods mutating an explicit state struct.

mod error;
mod state;

pub use error::MonitorError;
pub use state::MonitorState;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::exchange::PositionSource;
use crate::exchange::bybit::BybitExchange;
use crate::risk::RiskCalculator;
use crate::storage::{Settings, SettingsStore, SqliteSettingsStore, SqliteSettingsStoreConfig};

/// Risk exposure monitor.
///
/// One fetch per trigger: no polling, no concurrent request coordination.
pub struct Monitor {
    cfg: Config,
    exchange: Box<dyn PositionSource>,
    calculator: RiskCalculator,
    store: Option<Box<dyn SettingsStore>>,
    state: Mutex<MonitorState>,
}

impl Monitor {
    /// Creates a new Monitor from the application config.
    pub async fn from_config(cfg: Config) -> Result<Self, MonitorError> {
        let max_loss = cfg.max_loss().map_err(|e| MonitorError::Config(e.to_string()))?;
        let calculator = RiskCalculator::new(max_loss)?;

        let exchange = Box::new(BybitExchange::from_config(&cfg));

        let store: Option<Box<dyn SettingsStore>> = match cfg.storage {
            Some(ref storage) if storage.enabled => {
                let store_config = SqliteSettingsStoreConfig {
                    path: storage.path.clone().unwrap_or_default(),
                    ..Default::default()
                };
                Some(Box::new(SqliteSettingsStore::new(store_config).await?))
            }
            _ => None,
        };

        Ok(Self {
            cfg,
            exchange,
            calculator,
            store,
            state: Mutex::new(MonitorState::default()),
        })
    }

    /// Creates a Monitor with explicit collaborators (for tests).
    pub fn new(
        cfg: Config,
        exchange: Box<dyn PositionSource>,
        calculator: RiskCalculator,
        store: Option<Box<dyn SettingsStore>>,
    ) -> Self {
        Self {
            cfg,
            exchange,
            calculator,
            store,
            state: Mutex::new(MonitorState::default()),
        }
    }

    /// Returns a snapshot of the current state.
    pub async fn state(&self) -> MonitorState {
        self.state.lock().await.clone()
    }

    /// Fetches open positions and recomputes risk exposure.
    ///
    /// On success the state holds the new positions and summary. On failure
    /// the prior data stays untouched, the error message is recorded, and
    /// the error is also returned; a failed fetch requires an explicit
    /// re-trigger, there is no automatic retry.
    pub async fn refresh(&self) -> Result<(), MonitorError> {
        {
            let mut state = self.state.lock().await;
            state.loading = true;
        }

        let result = self.fetch_and_assess().await;

        let mut state = self.state.lock().await;
        state.loading = false;

        match result {
            Ok((positions, summary)) => {
                info!(
                    exchange = self.exchange.name(),
                    positions = positions.len(),
                    total_exposure = %summary.total_risk_exposure,
                    utilization = %summary.utilization_percent,
                    "positions refreshed"
                );
                state.positions = positions;
                state.summary = Some(summary);
                state.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "refresh failed, keeping previous data");
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch_and_assess(
        &self,
    ) -> Result<(Vec<crate::domain::AssessedPosition>, crate::domain::RiskSummary), MonitorError>
    {
        let positions = self.exchange.open_positions().await?;
        let (assessed, summary) = self.calculator.assess(&positions)?;
        Ok((assessed, summary))
    }

    /// Persists the current credentials, max loss, and environment.
    pub async fn save_settings(&self) -> Result<(), MonitorError> {
        let store = self.store.as_ref().ok_or(MonitorError::StorageDisabled)?;

        let settings = Settings {
            api_key: self.cfg.exchange.api_key.clone(),
            api_secret: self.cfg.exchange.api_secret.clone(),
            max_loss: self.cfg.risk.max_loss.clone(),
            environment: self
                .cfg
                .exchange
                .environment
                .clone()
                .unwrap_or_else(|| "testnet".to_string()),
        };

        store.save(&settings).await?;
        info!("settings saved");
        Ok(())
    }

    /// Loads previously saved settings, if any.
    pub async fn load_settings(&self) -> Result<Option<Settings>, MonitorError> {
        let store = self.store.as_ref().ok_or(MonitorError::StorageDisabled)?;
        Ok(store.load().await?)
    }

    /// Closes the settings store, if one is open.
    pub async fn shutdown(&self) -> Result<(), MonitorError> {
        if let Some(ref store) = self.store {
            store.close().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use crate::domain::{Position, PositionSide};
    use crate::exchange::{ExchangeError, PositionSource};

    struct FakeSource {
        results: std::sync::Mutex<std::collections::VecDeque<Result<Vec<Position>, ExchangeError>>>,
    }

    impl FakeSource {
        fn with_results(
            results: Vec<Result<Vec<Position>, ExchangeError>>,
        ) -> Self {
            Self {
                results: std::sync::Mutex::new(results.into_iter().collect()),
            }
        }

        fn ok(positions: Vec<Position>) -> Self {
            Self::with_results(vec![Ok(positions)])
        }
    }

    #[async_trait]
    impl PositionSource for FakeSource {
        async fn open_positions(&self) -> crate::exchange::Result<Vec<Position>> {
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .expect("no more queued results")
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn config() -> Config {
        serde_yaml::from_str(
            r#"
app:
  name: monitor
  env: development

exchange:
  environment: testnet

risk:
  max_loss: "100"
"#,
        )
        .unwrap()
    }

    fn position(side: PositionSide, size: &str, mark: &str, stop: &str) -> Position {
        Position {
            symbol: "BTCUSDT".to_string(),
            side,
            size: size.to_string(),
            entry_price: "98.00".to_string(),
            mark_price: mark.to_string(),
            unrealized_pnl: "0".to_string(),
            stop_loss: stop.to_string(),
            leverage: "10".to_string(),
            position_value: "1000".to_string(),
        }
    }

    fn monitor(source: FakeSource) -> Monitor {
        let calculator = RiskCalculator::new(Decimal::from(100)).unwrap();
        Monitor::new(config(), Box::new(source), calculator, None)
    }

    #[tokio::test]
    async fn test_refresh_updates_state() {
        let source = FakeSource::ok(vec![
            position(PositionSide::Buy, "10", "100", "95"),
            position(PositionSide::Sell, "5", "50", "55"),
        ]);
        let monitor = monitor(source);

        monitor.refresh().await.unwrap();

        let state = monitor.state().await;
        assert_eq!(state.positions.len(), 2);
        assert!(state.error.is_none());
        assert!(!state.loading);

        let summary = state.summary.unwrap();
        assert_eq!(summary.total_risk_exposure, Decimal::from(75));
        assert_eq!(summary.utilization_percent, Decimal::from(75));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_data() {
        let source = FakeSource::with_results(vec![
            Ok(vec![position(PositionSide::Buy, "10", "100", "95")]),
            Err(ExchangeError::Api {
                code: 10003,
                message: "API key is invalid.".to_string(),
            }),
        ]);
        let monitor = monitor(source);

        monitor.refresh().await.unwrap();

        let err = monitor.refresh().await.unwrap_err();
        assert!(matches!(err, MonitorError::Exchange(_)));

        let state = monitor.state().await;
        assert_eq!(state.positions.len(), 1);
        assert!(state.summary.is_some());
        let message = state.error.unwrap();
        assert!(message.contains("API key is invalid."));
    }

    #[tokio::test]
    async fn test_refresh_surfaces_malformed_data() {
        let source = FakeSource::ok(vec![position(PositionSide::Buy, "1", "oops", "95")]);
        let monitor = monitor(source);

        let err = monitor.refresh().await.unwrap_err();
        assert!(matches!(err, MonitorError::Risk(_)));

        let state = monitor.state().await;
        assert!(state.positions.is_empty());
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn test_save_settings_without_store_fails() {
        let source = FakeSource::ok(vec![]);
        let monitor = monitor(source);

        let err = monitor.save_settings().await.unwrap_err();
        assert!(matches!(err, MonitorError::StorageDisabled));
    }
}
