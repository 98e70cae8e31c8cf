//! Aptarb - Aptos Token Arbitrage Analyzer
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{ArbitrageService, Cli, CommandExecutor};
pub use domain::arbitrage::{ChargeBreakdown, ProfitabilityResult, Recommendation, RiskTier};
pub use domain::dex::{DexRegistry, FeeSchedule};
pub use infrastructure::market_data::MarketDataService;
pub use shared::types::{PriceSet, Route, TokenSymbol, TradingPair};
