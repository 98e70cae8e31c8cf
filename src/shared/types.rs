//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::ArbitrageError;

/// Smallest on-chain unit of APT (1 APT = 100,000,000 octas)
pub const OCTAS_PER_APT: f64 = 100_000_000.0;

/// Token universe supported by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSymbol {
    Apt,
    Usdc,
    Usdt,
}

impl TokenSymbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSymbol::Apt => "apt",
            TokenSymbol::Usdc => "usdc",
            TokenSymbol::Usdt => "usdt",
        }
    }

    pub fn all() -> [TokenSymbol; 3] {
        [TokenSymbol::Apt, TokenSymbol::Usdc, TokenSymbol::Usdt]
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenSymbol {
    type Err = ArbitrageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "apt" => Ok(TokenSymbol::Apt),
            "usdc" => Ok(TokenSymbol::Usdc),
            "usdt" => Ok(TokenSymbol::Usdt),
            other => Err(ArbitrageError::UnknownToken(other.to_string())),
        }
    }
}

/// Ordered base/quote trading pair, written as `base_quote` (e.g. `usdc_apt`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TradingPair {
    pub base: TokenSymbol,
    pub quote: TokenSymbol,
}

impl TradingPair {
    pub const USDC_APT: TradingPair = TradingPair {
        base: TokenSymbol::Usdc,
        quote: TokenSymbol::Apt,
    };
    pub const USDT_APT: TradingPair = TradingPair {
        base: TokenSymbol::Usdt,
        quote: TokenSymbol::Apt,
    };
    pub const APT_USDC: TradingPair = TradingPair {
        base: TokenSymbol::Apt,
        quote: TokenSymbol::Usdc,
    };
    pub const APT_USDT: TradingPair = TradingPair {
        base: TokenSymbol::Apt,
        quote: TokenSymbol::Usdt,
    };

    pub fn new(base: TokenSymbol, quote: TokenSymbol) -> Self {
        Self { base, quote }
    }

    pub fn tokens(&self) -> [TokenSymbol; 2] {
        [self.base, self.quote]
    }

    /// True when both pairs trade the same unordered token set
    pub fn same_token_set(&self, other: &TradingPair) -> bool {
        let mut a = self.tokens();
        let mut b = other.tokens();
        a.sort_by_key(|t| t.as_str());
        b.sort_by_key(|t| t.as_str());
        a == b
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.base, self.quote)
    }
}

impl FromStr for TradingPair {
    type Err = ArbitrageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .split_once('_')
            .ok_or_else(|| ArbitrageError::UnknownPair(s.to_string()))?;
        Ok(TradingPair {
            base: base
                .parse()
                .map_err(|_| ArbitrageError::UnknownPair(s.to_string()))?,
            quote: quote
                .parse()
                .map_err(|_| ArbitrageError::UnknownPair(s.to_string()))?,
        })
    }
}

impl From<TradingPair> for String {
    fn from(pair: TradingPair) -> Self {
        pair.to_string()
    }
}

impl TryFrom<String> for TradingPair {
    type Error = ArbitrageError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// USD prices for the supported tokens, passed explicitly into every
/// calculation. Never stored on a shared mutable engine instance so that
/// concurrent requests with different price overrides cannot leak into
/// each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSet {
    pub apt: f64,
    pub usdc: f64,
    pub usdt: f64,
}

impl PriceSet {
    pub fn new(apt: f64, usdc: f64, usdt: f64) -> Self {
        Self { apt, usdc, usdt }
    }

    pub fn get(&self, token: TokenSymbol) -> f64 {
        match token {
            TokenSymbol::Apt => self.apt,
            TokenSymbol::Usdc => self.usdc,
            TokenSymbol::Usdt => self.usdt,
        }
    }

    pub fn set(&mut self, token: TokenSymbol, price: f64) {
        match token {
            TokenSymbol::Apt => self.apt = price,
            TokenSymbol::Usdc => self.usdc = price,
            TokenSymbol::Usdt => self.usdt = price,
        }
    }

    /// Every price must be strictly positive; a non-positive price
    /// invalidates any computation referencing this set.
    pub fn validate(&self) -> Result<(), ArbitrageError> {
        for token in TokenSymbol::all() {
            let price = self.get(token);
            if price <= 0.0 {
                return Err(ArbitrageError::InvalidPrice { token, price });
            }
        }
        Ok(())
    }

    /// Apply per-token overrides; unknown token keys are ignored.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, f64>) {
        for (token, price) in overrides {
            if let Ok(symbol) = token.parse::<TokenSymbol>() {
                self.set(symbol, *price);
            }
        }
    }
}

impl Default for PriceSet {
    fn default() -> Self {
        Self {
            apt: 12.45,
            usdc: 1.00,
            usdt: 0.999,
        }
    }
}

/// A fully specified arbitrage route between two trading pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub from_pair: TradingPair,
    pub to_pair: TradingPair,
    pub from_dex: String,
    pub to_dex: String,
    pub trade_amount: f64,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub fullnode_url: String,
    pub timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            fullnode_url: "https://fullnode.mainnet.aptoslabs.com/v1".to_string(),
            timeout_ms: 5000,
        }
    }
}

/// Market data provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub coingecko_url: String,
    pub binance_url: String,
    pub dexscreener_url: String,
    pub defillama_url: String,
    pub fetch_timeout_ms: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            coingecko_url: "https://api.coingecko.com/api/v3/simple/price?ids=aptos,usd-coin,tether&vs_currencies=usd&include_market_cap=true&include_24hr_vol=true&include_24hr_change=true".to_string(),
            binance_url: "https://api.binance.com/api/v3/ticker/price?symbols=%5B%22APTUSDT%22,%22USDCUSDT%22%5D".to_string(),
            dexscreener_url: "https://api.dexscreener.com/latest/dex/search/?q=APT".to_string(),
            defillama_url: "https://api.llama.fi/chains/Aptos".to_string(),
            fetch_timeout_ms: 5000,
        }
    }
}

/// Arbitrage analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitrageConfig {
    pub default_trade_amount: f64,
    pub max_investment_apt: f64,
    pub result_cache_ttl_secs: u64,
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            default_trade_amount: 1000.0,
            max_investment_apt: 50000.0,
            result_cache_ttl_secs: 30,
        }
    }
}

/// Bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub network: NetworkConfig,
    pub market: MarketDataConfig,
    pub arbitrage: ArbitrageConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_symbol_parsing() {
        assert_eq!("apt".parse::<TokenSymbol>().unwrap(), TokenSymbol::Apt);
        assert_eq!("USDC".parse::<TokenSymbol>().unwrap(), TokenSymbol::Usdc);
        assert!(matches!(
            "sol".parse::<TokenSymbol>(),
            Err(ArbitrageError::UnknownToken(_))
        ));
    }

    #[test]
    fn test_trading_pair_round_trip() {
        let pair: TradingPair = "usdc_apt".parse().unwrap();
        assert_eq!(pair, TradingPair::USDC_APT);
        assert_eq!(pair.to_string(), "usdc_apt");
        assert!(matches!(
            "usdc-apt".parse::<TradingPair>(),
            Err(ArbitrageError::UnknownPair(_))
        ));
    }

    #[test]
    fn test_same_token_set() {
        assert!(TradingPair::USDC_APT.same_token_set(&TradingPair::APT_USDC));
        assert!(!TradingPair::USDC_APT.same_token_set(&TradingPair::USDT_APT));
    }

    #[test]
    fn test_price_set_validation() {
        let mut prices = PriceSet::default();
        assert!(prices.validate().is_ok());

        prices.set(TokenSymbol::Usdt, 0.0);
        match prices.validate() {
            Err(ArbitrageError::InvalidPrice { token, price }) => {
                assert_eq!(token, TokenSymbol::Usdt);
                assert_eq!(price, 0.0);
            }
            other => panic!("expected InvalidPrice, got {:?}", other),
        }
    }

    #[test]
    fn test_price_overrides_ignore_unknown_tokens() {
        let mut prices = PriceSet::default();
        let mut overrides = HashMap::new();
        overrides.insert("apt".to_string(), 10.0);
        overrides.insert("sol".to_string(), 99.0);

        prices.apply_overrides(&overrides);
        assert_eq!(prices.apt, 10.0);
        assert_eq!(prices.usdc, 1.00);
    }
}
