//! Error handling for the application

use thiserror::Error;

use crate::shared::types::TokenSymbol;

/// Arbitrage-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArbitrageError {
    #[error("Invalid trade amount: {0} (must be positive)")]
    InvalidTradeAmount(f64),

    #[error("Invalid price for {token}: ${price}")]
    InvalidPrice { token: TokenSymbol, price: f64 },

    #[error(
        "Impossible arbitrage scenario: {from_pair} -> {to_pair} is a round trip \
         on identical DEXs ({from_dex} vs {to_dex})"
    )]
    ImpossibleRoute {
        from_pair: String,
        to_pair: String,
        from_dex: String,
        to_dex: String,
    },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Unknown token symbol: {0}")]
    UnknownToken(String),

    #[error("Unknown trading pair: {0}")]
    UnknownPair(String),
}

/// Market data retrieval errors
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("{provider} returned status {status}")]
    BadStatus { provider: &'static str, status: u16 },

    #[error("All price sources failed: {0}")]
    AllSourcesFailed(String),

    #[error("Market data fetch timed out after {0}ms")]
    Timeout(u64),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        MarketDataError::ApiError(err.to_string())
    }
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Arbitrage error: {0}")]
    Arbitrage(#[from] ArbitrageError),

    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
