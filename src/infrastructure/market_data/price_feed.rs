//! Live token price providers with a fallback chain

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::shared::errors::MarketDataError;
use crate::shared::types::MarketDataConfig;

/// Quote for a single token
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenQuote {
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub change_24h: f64,
}

/// Quotes for the full token universe plus the source that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuotes {
    pub apt: TokenQuote,
    pub usdc: TokenQuote,
    pub usdt: TokenQuote,
    pub source: &'static str,
}

impl PriceQuotes {
    /// Hard-coded quotes used when every provider fails
    pub fn fallback() -> Self {
        Self {
            apt: TokenQuote {
                price: 12.45,
                market_cap: 5_200_000_000.0,
                volume_24h: 180_000_000.0,
                change_24h: 0.0,
            },
            usdc: TokenQuote {
                price: 1.0,
                market_cap: 25_000_000_000.0,
                volume_24h: 2_800_000_000.0,
                change_24h: 0.0,
            },
            usdt: TokenQuote {
                price: 0.999,
                market_cap: 95_000_000_000.0,
                volume_24h: 15_000_000_000.0,
                change_24h: 0.0,
            },
            source: "fallback",
        }
    }
}

/// Source of USD token prices
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_prices(&self) -> Result<PriceQuotes, MarketDataError>;
}

/// CoinGecko-first price feed with Binance as backup
pub struct PriceFeed {
    client: reqwest::Client,
    coingecko_url: String,
    binance_url: String,
}

impl PriceFeed {
    pub fn new(config: &MarketDataConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            coingecko_url: config.coingecko_url.clone(),
            binance_url: config.binance_url.clone(),
        }
    }

    async fn fetch_coingecko(&self) -> Result<PriceQuotes, MarketDataError> {
        let response = self
            .client
            .get(&self.coingecko_url)
            .timeout(Duration::from_secs(4))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketDataError::BadStatus {
                provider: "CoinGecko",
                status: response.status().as_u16(),
            });
        }

        let data: Value = response.json().await?;
        let fallback = PriceQuotes::fallback();

        let quote = |id: &str, defaults: TokenQuote| TokenQuote {
            price: data[id]["usd"].as_f64().unwrap_or(defaults.price),
            market_cap: data[id]["usd_market_cap"]
                .as_f64()
                .unwrap_or(defaults.market_cap),
            volume_24h: data[id]["usd_24h_vol"]
                .as_f64()
                .unwrap_or(defaults.volume_24h),
            change_24h: data[id]["usd_24h_change"].as_f64().unwrap_or(0.0),
        };

        let quotes = PriceQuotes {
            apt: quote("aptos", fallback.apt),
            usdc: quote("usd-coin", fallback.usdc),
            usdt: quote("tether", fallback.usdt),
            source: "coingecko_live",
        };
        info!(
            "CoinGecko prices: APT=${}, USDC=${}, USDT=${}",
            quotes.apt.price, quotes.usdc.price, quotes.usdt.price
        );
        Ok(quotes)
    }

    async fn fetch_binance(&self) -> Result<PriceQuotes, MarketDataError> {
        let response = self
            .client
            .get(&self.binance_url)
            .timeout(Duration::from_secs(3))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketDataError::BadStatus {
                provider: "Binance",
                status: response.status().as_u16(),
            });
        }

        let data: Value = response.json().await?;
        let mut quotes = PriceQuotes::fallback();

        if let Some(tickers) = data.as_array() {
            for ticker in tickers {
                let symbol = ticker["symbol"].as_str().unwrap_or_default();
                let price = ticker["price"]
                    .as_str()
                    .and_then(|p| p.parse::<f64>().ok())
                    .unwrap_or(0.0);
                if price <= 0.0 {
                    continue;
                }
                match symbol {
                    "APTUSDT" => quotes.apt.price = price,
                    "USDCUSDT" => quotes.usdc.price = price,
                    _ => {}
                }
            }
        }

        quotes.source = "binance_live";
        info!(
            "Binance backup prices: APT=${}, USDC=${}",
            quotes.apt.price, quotes.usdc.price
        );
        Ok(quotes)
    }
}

#[async_trait]
impl PriceProvider for PriceFeed {
    async fn fetch_prices(&self) -> Result<PriceQuotes, MarketDataError> {
        match self.fetch_coingecko().await {
            Ok(quotes) => Ok(quotes),
            Err(primary) => {
                warn!("CoinGecko price fetch failed: {}", primary);
                self.fetch_binance().await.map_err(|backup| {
                    MarketDataError::AllSourcesFailed(format!(
                        "CoinGecko ({}), Binance ({})",
                        primary, backup
                    ))
                })
            }
        }
    }
}
