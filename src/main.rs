mod app;
mod config;
mod domain;
mod exchange;
mod risk;
mod storage;

use std::env;

use app::Monitor;
use config::Config;
use exchange::bybit::BybitExchange;
use tracing::{Level, debug, error, info};
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

fn parse_config_path() -> String {
    for arg in env::args().skip(1) {
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}

fn parse_symbol() -> Option<String> {
    for arg in env::args().skip(1) {
        if let Some(symbol) = arg.strip_prefix("--symbol=") {
            return Some(symbol.to_string());
        }
    }
    None
}

fn init_tracing(log_level: Option<&str>) {
    let level = match log_level {
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config_path = parse_config_path();

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return;
        }
    };

    init_tracing(config.app.log_level.as_deref());

    // One-off query modes
    if env::args().any(|arg| arg == "--account-info") {
        show_account_info(&config).await;
        return;
    }

    if let Some(symbol) = parse_symbol() {
        show_symbol_position(&config, &symbol).await;
        return;
    }

    let monitor = match Monitor::from_config(config).await {
        Ok(monitor) => monitor,
        Err(e) => {
            eprintln!("Failed to create monitor: {}", e);
            return;
        }
    };

    info!(config = %config_path, "Monitor initialized");

    match monitor.load_settings().await {
        Ok(Some(settings)) => {
            info!(environment = %settings.environment, max_loss = %settings.max_loss, "Saved settings found")
        }
        Ok(None) => debug!("No saved settings"),
        Err(app::MonitorError::StorageDisabled) => {}
        Err(e) => error!(error = %e, "Failed to load settings"),
    }

    if env::args().any(|arg| arg == "--save-settings") {
        match monitor.save_settings().await {
            Ok(()) => info!("Settings saved"),
            Err(e) => error!(error = %e, "Failed to save settings"),
        }
    }

    match monitor.refresh().await {
        Ok(()) => report(&monitor).await,
        Err(e) => error!(error = %e, "Failed to fetch positions"),
    }

    let _ = monitor.shutdown().await;
}

/// Logs the assessed positions and the aggregate summary.
async fn report(monitor: &Monitor) {
    let state = monitor.state().await;

    for position in &state.positions {
        debug!(
            symbol = %position.position.symbol,
            side = %position.position.side,
            size = %position.position.size,
            mark_price = %position.position.mark_price,
            stop_loss = %position.position.stop_loss,
            exposure = %position.risk_exposure,
            "position"
        );
    }

    if let Some(summary) = state.summary {
        info!(
            positions = state.positions.len(),
            total_exposure = %summary.total_risk_exposure,
            max_loss = %summary.max_loss,
            utilization_percent = %summary.utilization_percent,
            "risk exposure summary"
        );
    }
}

/// Fetches and logs account info and wallet balance.
async fn show_account_info(config: &Config) {
    let exchange = BybitExchange::from_config(config);

    match exchange.account_info().await {
        Ok(info) => info!(account = %info, "Account info received"),
        Err(e) => error!(error = %e, "Failed to get account info"),
    }

    match exchange.wallet_balance().await {
        Ok(balance) => info!(balance = %balance, "Wallet balance received"),
        Err(e) => error!(error = %e, "Failed to get wallet balance"),
    }
}

/// Fetches and logs the open position for a single symbol.
async fn show_symbol_position(config: &Config, symbol: &str) {
    let exchange = BybitExchange::from_config(config);

    match exchange.symbol_position(symbol).await {
        Ok(Some(position)) => info!(
            symbol = %position.symbol,
            side = %position.side,
            size = %position.size,
            mark_price = %position.mark_price,
            stop_loss = %position.stop_loss,
            "Position found"
        ),
        Ok(None) => info!(symbol = %symbol, "No active position found for this symbol"),
        Err(e) => error!(error = %e, "Failed to get position"),
    }
}
