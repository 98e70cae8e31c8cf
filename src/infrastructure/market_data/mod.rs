//! Market data retrieval - prices, gas and TVL with fallback chains

pub mod defi_feed;
pub mod gas_feed;
pub mod price_feed;
pub mod snapshot;

pub use defi_feed::{DefiFeed, DefiProvider, TvlEstimate};
pub use gas_feed::{GasEstimate, GasFeed, GasProvider, FALLBACK_GAS_UNIT_PRICE};
pub use price_feed::{PriceFeed, PriceProvider, PriceQuotes, TokenQuote};
pub use snapshot::{
    DataProvenance, DataSources, MarketDataService, MarketOverview, MarketSnapshot, ResultCache,
};
