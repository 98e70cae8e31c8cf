//! Aptos gas unit price retrieval

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::shared::errors::MarketDataError;
use crate::shared::types::NetworkConfig;

/// Gas unit price used when the fullnode is unreachable (octas per unit)
pub const FALLBACK_GAS_UNIT_PRICE: u64 = 100;

/// Current gas pricing as reported by the fullnode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    pub gas_unit_price: u64,
    pub prioritized_gas: u64,
    pub deprioritized_gas: u64,
}

impl GasEstimate {
    pub fn fallback() -> Self {
        Self {
            gas_unit_price: FALLBACK_GAS_UNIT_PRICE,
            prioritized_gas: 150,
            deprioritized_gas: FALLBACK_GAS_UNIT_PRICE,
        }
    }
}

/// Source of the chain's gas unit price
#[async_trait]
pub trait GasProvider: Send + Sync {
    async fn fetch_gas_price(&self) -> Result<GasEstimate, MarketDataError>;
}

/// Fullnode-backed gas feed
pub struct GasFeed {
    client: reqwest::Client,
    estimate_url: String,
}

impl GasFeed {
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            estimate_url: format!(
                "{}/estimate_gas_price",
                config.fullnode_url.trim_end_matches('/')
            ),
        }
    }
}

#[async_trait]
impl GasProvider for GasFeed {
    async fn fetch_gas_price(&self) -> Result<GasEstimate, MarketDataError> {
        let response = self
            .client
            .get(&self.estimate_url)
            .timeout(Duration::from_secs(3))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketDataError::BadStatus {
                provider: "Aptos fullnode",
                status: response.status().as_u16(),
            });
        }

        let data: Value = response.json().await?;
        let estimate = GasEstimate {
            gas_unit_price: data["gas_estimate"]
                .as_u64()
                .unwrap_or(FALLBACK_GAS_UNIT_PRICE),
            prioritized_gas: data["prioritized_gas_estimate"].as_u64().unwrap_or(150),
            deprioritized_gas: data["deprioritized_gas_estimate"]
                .as_u64()
                .unwrap_or(FALLBACK_GAS_UNIT_PRICE),
        };
        info!(
            "Live gas price: {} octas/unit (prioritized: {})",
            estimate.gas_unit_price, estimate.prioritized_gas
        );
        Ok(estimate)
    }
}
