//! Market snapshot assembly and short-lived result caching
//!
//! Every computation consumes a fully resolved snapshot: live data is
//! preferred, each source independently falls back to hard-coded values,
//! and an overall timeout returns the last successful snapshot instead of
//! blocking the caller.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::defi_feed::{DefiProvider, TvlEstimate};
use super::gas_feed::{GasEstimate, GasProvider};
use super::price_feed::{PriceProvider, PriceQuotes};
use crate::shared::types::{BotConfig, PriceSet, TokenSymbol, OCTAS_PER_APT};
use crate::shared::utils::format_thousands;

/// Where a piece of market data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataProvenance {
    Live,
    Cached,
    Fallback,
}

impl DataProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataProvenance::Live => "live",
            DataProvenance::Cached => "cached",
            DataProvenance::Fallback => "fallback",
        }
    }
}

/// Provenance per data source, passed through to result payloads untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataSources {
    pub price_source: DataProvenance,
    pub gas_source: DataProvenance,
    pub defi_source: DataProvenance,
}

/// A complete, already-resolved view of the market for one evaluation
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub prices: PriceSet,
    pub quotes: PriceQuotes,
    pub gas: GasEstimate,
    pub tvl: TvlEstimate,
    pub data_sources: DataSources,
    pub fetched_at: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn fallback() -> Self {
        let quotes = PriceQuotes::fallback();
        Self {
            prices: PriceSet::new(quotes.apt.price, quotes.usdc.price, quotes.usdt.price),
            quotes,
            gas: GasEstimate::fallback(),
            tvl: TvlEstimate::fallback(),
            data_sources: DataSources {
                price_source: DataProvenance::Fallback,
                gas_source: DataProvenance::Fallback,
                defi_source: DataProvenance::Fallback,
            },
            fetched_at: Utc::now(),
        }
    }
}

/// Gas units per transfer, by token complexity
fn gas_units_for_token(token: TokenSymbol) -> u64 {
    match token {
        TokenSymbol::Apt => 500,
        TokenSymbol::Usdc | TokenSymbol::Usdt => 800,
    }
}

/// Global TVL shown per token; the stablecoins carry their cross-chain totals
fn tvl_for_token(token: TokenSymbol, aptos_tvl: &str) -> String {
    match token {
        TokenSymbol::Apt => aptos_tvl.to_string(),
        TokenSymbol::Usdc => "$45,000,000,000".to_string(),
        TokenSymbol::Usdt => "$95,000,000,000".to_string(),
    }
}

/// Gas pricing details for one overview row
#[derive(Debug, Clone, Serialize)]
pub struct GasDetails {
    pub gas_unit_price_octas: u64,
    pub gas_units: u64,
    pub gas_cost_apt: f64,
}

/// One token row of the market overview
#[derive(Debug, Clone, Serialize)]
pub struct ChainOverview {
    pub chain: String,
    pub current_price: String,
    pub gas_fees: String,
    pub gas_details: GasDetails,
    pub tvl_usd: String,
    pub market_cap: String,
    pub fully_diluted_valuation: String,
    pub volume_24h: String,
}

/// Market overview payload
#[derive(Debug, Clone, Serialize)]
pub struct MarketOverview {
    pub status: &'static str,
    pub timestamp: String,
    pub base_currency: &'static str,
    pub chains: Vec<ChainOverview>,
    pub data_sources: DataSources,
}

/// Assembles market snapshots from the configured providers and remembers
/// the last successful one.
pub struct MarketDataService {
    price_provider: Box<dyn PriceProvider>,
    gas_provider: Box<dyn GasProvider>,
    defi_provider: Box<dyn DefiProvider>,
    stored: RwLock<MarketSnapshot>,
    timeout_ms: u64,
}

impl MarketDataService {
    pub fn new(config: &BotConfig) -> Self {
        Self::with_providers(
            Box::new(super::price_feed::PriceFeed::new(&config.market)),
            Box::new(super::gas_feed::GasFeed::new(&config.network)),
            Box::new(super::defi_feed::DefiFeed::new(&config.market)),
            config.market.fetch_timeout_ms,
        )
    }

    pub fn with_providers(
        price_provider: Box<dyn PriceProvider>,
        gas_provider: Box<dyn GasProvider>,
        defi_provider: Box<dyn DefiProvider>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            price_provider,
            gas_provider,
            defi_provider,
            stored: RwLock::new(MarketSnapshot::fallback()),
            timeout_ms,
        }
    }

    /// Fetch a fresh snapshot: all providers queried concurrently under one
    /// timeout. Individual failures degrade to fallback values; an overall
    /// timeout returns the previously stored snapshot.
    pub async fn fetch_snapshot(&self) -> MarketSnapshot {
        let started = Instant::now();
        let fetch_all = async {
            futures::join!(
                self.price_provider.fetch_prices(),
                self.gas_provider.fetch_gas_price(),
                self.defi_provider.fetch_tvl(),
            )
        };

        match tokio::time::timeout(Duration::from_millis(self.timeout_ms), fetch_all).await {
            Ok((price_result, gas_result, defi_result)) => {
                let (quotes, price_source) = match price_result {
                    Ok(quotes) => (quotes, DataProvenance::Live),
                    Err(e) => {
                        warn!("Price fetch failed, using fallback: {}", e);
                        (PriceQuotes::fallback(), DataProvenance::Fallback)
                    }
                };
                let (gas, gas_source) = match gas_result {
                    Ok(gas) => (gas, DataProvenance::Live),
                    Err(e) => {
                        warn!("Gas fetch failed, using fallback: {}", e);
                        (GasEstimate::fallback(), DataProvenance::Fallback)
                    }
                };
                let (tvl, defi_source) = match defi_result {
                    Ok(tvl) => (tvl, DataProvenance::Live),
                    Err(e) => {
                        warn!("TVL fetch failed, using fallback: {}", e);
                        (TvlEstimate::fallback(), DataProvenance::Fallback)
                    }
                };

                let snapshot = MarketSnapshot {
                    prices: PriceSet::new(quotes.apt.price, quotes.usdc.price, quotes.usdt.price),
                    quotes,
                    gas,
                    tvl,
                    data_sources: DataSources {
                        price_source,
                        gas_source,
                        defi_source,
                    },
                    fetched_at: Utc::now(),
                };

                info!(
                    "Market snapshot assembled in {}ms (price: {:?}, gas: {:?}, defi: {:?})",
                    started.elapsed().as_millis(),
                    price_source,
                    gas_source,
                    defi_source
                );

                *self.stored.write().await = snapshot.clone();
                snapshot
            }
            Err(_) => {
                warn!(
                    "Market data fetch timed out after {}ms, returning stored snapshot",
                    self.timeout_ms
                );
                let mut snapshot = self.stored.read().await.clone();
                snapshot.data_sources = DataSources {
                    price_source: DataProvenance::Cached,
                    gas_source: DataProvenance::Cached,
                    defi_source: DataProvenance::Cached,
                };
                snapshot
            }
        }
    }

    /// Last successfully stored snapshot without touching the network
    pub async fn stored_snapshot(&self) -> MarketSnapshot {
        self.stored.read().await.clone()
    }

    /// Per-token market overview rows derived from a snapshot
    pub fn market_overview(snapshot: &MarketSnapshot) -> MarketOverview {
        let mut chains = Vec::new();
        for token in TokenSymbol::all() {
            let quote = match token {
                TokenSymbol::Apt => snapshot.quotes.apt,
                TokenSymbol::Usdc => snapshot.quotes.usdc,
                TokenSymbol::Usdt => snapshot.quotes.usdt,
            };
            let gas_units = gas_units_for_token(token);
            let gas_cost_apt = (gas_units * snapshot.gas.gas_unit_price) as f64 / OCTAS_PER_APT;

            chains.push(ChainOverview {
                chain: token.as_str().to_string(),
                current_price: format!("{}", quote.price),
                gas_fees: format!("{:.6}", gas_cost_apt),
                gas_details: GasDetails {
                    gas_unit_price_octas: snapshot.gas.gas_unit_price,
                    gas_units,
                    gas_cost_apt,
                },
                tvl_usd: tvl_for_token(token, &snapshot.tvl.tvl_usd),
                market_cap: format!("${}", format_thousands(quote.market_cap as u64)),
                fully_diluted_valuation: format!("${}", format_thousands(quote.market_cap as u64)),
                volume_24h: format!("${}", format_thousands(quote.volume_24h as u64)),
            });
        }

        MarketOverview {
            status: "success",
            timestamp: crate::shared::utils::utc_timestamp(),
            base_currency: "usd",
            chains,
            data_sources: snapshot.data_sources,
        }
    }
}

/// Last-good-result cache with a short TTL. Purely a fallback for callers
/// that want the previous payload without recomputation; never consulted
/// during an evaluation.
pub struct ResultCache<T> {
    inner: RwLock<Option<(T, Instant)>>,
    ttl: Duration,
}

impl<T: Clone> ResultCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(None),
            ttl,
        }
    }

    pub async fn store(&self, value: T) {
        *self.inner.write().await = Some((value, Instant::now()));
    }

    /// The cached value, if it has not outlived its TTL
    pub async fn get(&self) -> Option<T> {
        let guard = self.inner.read().await;
        match guard.as_ref() {
            Some((value, stored_at)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    pub async fn age(&self) -> Option<Duration> {
        let guard = self.inner.read().await;
        guard.as_ref().map(|(_, stored_at)| stored_at.elapsed())
    }
}
