//! Bybit v5 exchange integration.
//!
//! Wraps the signed [`Client`] and maps the exchange's response envelope
//! into domain positions.

mod client;

pub use client::{Client, ClientConfig, ClientError, Environment};

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{Position, PositionSide};
use crate::exchange::{ExchangeError, PositionSource, Result};

const EXCHANGE_NAME: &str = "bybit";

/// Derivatives category queried for the dashboard.
const CATEGORY_LINEAR: &str = "linear";

/// Response envelope wrapping every Bybit v5 payload.
///
/// `ret_code == 0` signals success; any other value is an application-level
/// error carrying `ret_msg`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "retCode")]
    ret_code: i32,
    #[serde(rename = "retMsg")]
    ret_msg: String,
    result: Option<T>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<T> {
        if self.ret_code != 0 {
            return Err(ExchangeError::Api {
                code: self.ret_code,
                message: self.ret_msg,
            });
        }
        self.result
            .ok_or_else(|| ExchangeError::MalformedResponse("missing result".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct PositionList {
    list: Vec<RawPosition>,
}

/// Position record exactly as the exchange returns it.
#[derive(Debug, Deserialize)]
struct RawPosition {
    symbol: String,
    side: String,
    #[serde(default)]
    size: String,
    #[serde(rename = "avgPrice", default)]
    avg_price: String,
    #[serde(rename = "markPrice", default)]
    mark_price: String,
    #[serde(rename = "unrealisedPnl", default)]
    unrealised_pnl: String,
    #[serde(rename = "stopLoss", default)]
    stop_loss: String,
    #[serde(default)]
    leverage: String,
    #[serde(rename = "positionValue", default)]
    position_value: String,
}

impl RawPosition {
    /// True when the record represents an open position: size parses to a
    /// value strictly greater than zero.
    fn is_open(&self) -> bool {
        Decimal::from_str(&self.size)
            .map(|size| size > Decimal::ZERO)
            .unwrap_or(false)
    }

    fn into_position(self) -> Position {
        let side = match self.side.as_str() {
            "Sell" => PositionSide::Sell,
            _ => PositionSide::Buy,
        };

        let stop_loss = if self.stop_loss.is_empty() {
            "0.00".to_string()
        } else {
            self.stop_loss
        };

        Position {
            symbol: self.symbol,
            side,
            size: self.size,
            entry_price: self.avg_price,
            mark_price: self.mark_price,
            unrealized_pnl: self.unrealised_pnl,
            stop_loss,
            leverage: self.leverage,
            position_value: self.position_value,
        }
    }
}

/// Maps a raw position-list envelope body into domain positions.
///
/// Keeps only open positions, preserving exchange ordering.
fn map_positions(body: &[u8]) -> Result<Vec<Position>> {
    let envelope: Envelope<PositionList> = serde_json::from_slice(body)
        .map_err(|e| ExchangeError::MalformedResponse(e.to_string()))?;

    let list = envelope.into_result()?.list;

    Ok(list
        .into_iter()
        .filter(RawPosition::is_open)
        .map(RawPosition::into_position)
        .collect())
}

fn client_error(e: ClientError) -> ExchangeError {
    match e {
        ClientError::Transport(e) => ExchangeError::Transport(e.to_string()),
        ClientError::Http { status, body } => {
            ExchangeError::Http(format!("status {}: {}", status, body))
        }
        ClientError::Json(e) => ExchangeError::MalformedResponse(e.to_string()),
    }
}

/// Bybit exchange implementation.
pub struct BybitExchange {
    client: Client,
}

impl BybitExchange {
    /// Creates a new BybitExchange with the given client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a new BybitExchange from the application config.
    pub fn from_config(config: &Config) -> Self {
        let environment = config
            .exchange
            .environment
            .as_deref()
            .map(Environment::parse)
            .unwrap_or_default();

        let client = Client::new(ClientConfig::new(
            config.exchange.api_key.clone(),
            config.exchange.api_secret.clone(),
            environment,
        ));

        info!(environment = %environment, "bybit exchange configured");

        Self::new(client)
    }

    /// Fetches the open position for a single symbol, or `None` when flat.
    pub async fn symbol_position(&self, symbol: &str) -> Result<Option<Position>> {
        let body = self
            .client
            .get_positions(CATEGORY_LINEAR, Some(symbol), None)
            .await
            .map_err(client_error)?;

        Ok(map_positions(&body)?.into_iter().next())
    }

    /// Fetches account information as a raw JSON value.
    pub async fn account_info(&self) -> Result<serde_json::Value> {
        let body = self.client.get_account_info().await.map_err(client_error)?;

        let envelope: Envelope<serde_json::Value> = serde_json::from_slice(&body)
            .map_err(|e| ExchangeError::MalformedResponse(e.to_string()))?;

        envelope.into_result()
    }

    /// Fetches wallet balance for the unified account as a raw JSON value.
    pub async fn wallet_balance(&self) -> Result<serde_json::Value> {
        let body = self
            .client
            .get_wallet_balance(None)
            .await
            .map_err(client_error)?;

        let envelope: Envelope<serde_json::Value> = serde_json::from_slice(&body)
            .map_err(|e| ExchangeError::MalformedResponse(e.to_string()))?;

        envelope.into_result()
    }
}

#[async_trait]
impl PositionSource for BybitExchange {
    async fn open_positions(&self) -> Result<Vec<Position>> {
        let body = self
            .client
            .get_positions(CATEGORY_LINEAR, None, None)
            .await
            .map_err(client_error)?;

        let positions = map_positions(&body)?;

        debug!(count = positions.len(), "open positions fetched");

        Ok(positions)
    }

    fn name(&self) -> &str {
        EXCHANGE_NAME
    }
}
