//! Assumed price-spread model between trading-pair and DEX combinations
//!
//! The spread heuristic stands in for live order books: it derives a
//! percentage differential from the current token prices plus a fixed
//! per-venue variation table. The constants below are the market model;
//! changing them changes every profitability verdict downstream.

use crate::domain::dex::DexRegistry;
use crate::shared::errors::ArbitrageError;
use crate::shared::types::{PriceSet, TokenSymbol, TradingPair};

/// Minimal residual spread between indistinguishable venues on distinct pairs
const MINIMAL_SPREAD_PERCENT: f64 = 0.05;

/// True when the two pairs trade the same unordered token set, i.e. the
/// route is a round trip
pub fn is_round_trip_same_pair(from_pair: TradingPair, to_pair: TradingPair) -> bool {
    from_pair.same_token_set(&to_pair)
}

/// Venue-driven spread component in percent
fn dex_spread(from_dex: &str, to_dex: &str) -> f64 {
    let both_generic =
        DexRegistry::is_generic_placeholder(from_dex) && DexRegistry::is_generic_placeholder(to_dex);
    if both_generic {
        // Two placeholders are the same venue for pricing purposes
        return 0.0;
    }
    (DexRegistry::price_factor(from_dex) - DexRegistry::price_factor(to_dex)).abs() * 100.0
}

/// Assumed spread in percent for a route, or the reason none exists.
///
/// A round trip on a single venue, or across two indistinguishable
/// placeholder venues, has no price or fee differential to exploit and is
/// rejected as impossible rather than being priced near zero. Invalid
/// prices are rejected separately so callers can distinguish bad input from
/// a structurally broken route.
pub fn assumed_spread(
    from_pair: TradingPair,
    to_pair: TradingPair,
    from_dex: &str,
    to_dex: &str,
    prices: &PriceSet,
) -> Result<f64, ArbitrageError> {
    prices.validate()?;

    let identical_venues = from_dex == to_dex
        || (DexRegistry::is_generic_placeholder(from_dex)
            && DexRegistry::is_generic_placeholder(to_dex));
    if identical_venues && is_round_trip_same_pair(from_pair, to_pair) {
        return Err(ArbitrageError::ImpossibleRoute {
            from_pair: from_pair.to_string(),
            to_pair: to_pair.to_string(),
            from_dex: from_dex.to_string(),
            to_dex: to_dex.to_string(),
        });
    }

    let dex_spread = dex_spread(from_dex, to_dex);
    let apt = prices.get(TokenSymbol::Apt);
    let usdc = prices.get(TokenSymbol::Usdc);
    let usdt = prices.get(TokenSymbol::Usdt);

    let spread = match (from_pair, to_pair) {
        (TradingPair::USDC_APT, TradingPair::USDT_APT) => {
            let usdc_apt_rate = apt / usdc;
            let usdt_apt_rate = apt / usdt;
            let rate_diff = (usdc_apt_rate - usdt_apt_rate).abs() / usdc_apt_rate * 100.0;
            (0.6 + rate_diff * 0.1 + dex_spread).min(3.0)
        }
        (TradingPair::USDT_APT, TradingPair::USDC_APT) => {
            let usdt_apt_rate = apt / usdt;
            let usdc_apt_rate = apt / usdc;
            let rate_diff = (usdt_apt_rate - usdc_apt_rate).abs() / usdt_apt_rate * 100.0;
            (0.5 + rate_diff * 0.1 + dex_spread).min(3.0)
        }
        (TradingPair::APT_USDC, TradingPair::APT_USDT) => {
            let stablecoin_diff = (usdc - usdt).abs() / usdc * 100.0;
            (0.3 + stablecoin_diff + dex_spread).min(2.0)
        }
        (TradingPair::APT_USDT, TradingPair::APT_USDC) => {
            let stablecoin_diff = (usdt - usdc).abs() / usdt * 100.0;
            (0.4 + stablecoin_diff + dex_spread).min(2.0)
        }
        _ => {
            if dex_spread == 0.0 {
                MINIMAL_SPREAD_PERCENT
            } else {
                0.2 + dex_spread
            }
        }
    };

    Ok(spread)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_detection() {
        assert!(is_round_trip_same_pair(
            TradingPair::USDC_APT,
            TradingPair::APT_USDC
        ));
        assert!(is_round_trip_same_pair(
            TradingPair::USDC_APT,
            TradingPair::USDC_APT
        ));
        assert!(!is_round_trip_same_pair(
            TradingPair::USDC_APT,
            TradingPair::USDT_APT
        ));
    }

    #[test]
    fn test_impossible_route_on_generic_round_trip() {
        let result = assumed_spread(
            TradingPair::USDC_APT,
            TradingPair::APT_USDC,
            "dex_a",
            "dex_b",
            &PriceSet::default(),
        );
        assert!(matches!(result, Err(ArbitrageError::ImpossibleRoute { .. })));
    }

    #[test]
    fn test_same_named_venue_round_trip_is_impossible() {
        let result = assumed_spread(
            TradingPair::USDC_APT,
            TradingPair::APT_USDC,
            "pancakeswap",
            "pancakeswap",
            &PriceSet::default(),
        );
        assert!(matches!(result, Err(ArbitrageError::ImpossibleRoute { .. })));
    }

    #[test]
    fn test_named_venues_allow_round_trip_pairs() {
        // Named DEXs have a real fee/price differential, so the same token
        // set is not automatically impossible
        let spread = assumed_spread(
            TradingPair::USDC_APT,
            TradingPair::APT_USDC,
            "pancakeswap",
            "thalaswap",
            &PriceSet::default(),
        )
        .unwrap();
        // Fallback direction: 0.2 + |1.002 - 0.998| * 100
        assert!((spread - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_price_is_distinct_from_impossible() {
        let prices = PriceSet::new(0.0, 1.0, 0.999);
        let result = assumed_spread(
            TradingPair::USDC_APT,
            TradingPair::USDT_APT,
            "dex_a",
            "dex_b",
            &prices,
        );
        assert!(matches!(result, Err(ArbitrageError::InvalidPrice { .. })));
    }

    #[test]
    fn test_usdc_apt_to_usdt_apt_formula() {
        let prices = PriceSet::new(12.45, 1.00, 0.999);
        let spread = assumed_spread(
            TradingPair::USDC_APT,
            TradingPair::USDT_APT,
            "dex_a",
            "dex_b",
            &prices,
        )
        .unwrap();

        let usdc_apt_rate: f64 = 12.45 / 1.00;
        let usdt_apt_rate: f64 = 12.45 / 0.999;
        let rate_diff = (usdc_apt_rate - usdt_apt_rate).abs() / usdc_apt_rate * 100.0;
        assert!((spread - (0.6 + rate_diff * 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_reverse_direction_uses_lower_base() {
        let prices = PriceSet::new(12.45, 1.00, 1.00);
        let forward = assumed_spread(
            TradingPair::USDC_APT,
            TradingPair::USDT_APT,
            "dex_a",
            "dex_b",
            &prices,
        )
        .unwrap();
        let reverse = assumed_spread(
            TradingPair::USDT_APT,
            TradingPair::USDC_APT,
            "dex_a",
            "dex_b",
            &prices,
        )
        .unwrap();
        // Equal stable prices leave only the base constants
        assert!((forward - 0.6).abs() < 1e-12);
        assert!((reverse - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_stablecoin_directions_capped_at_two_percent() {
        let prices = PriceSet::new(12.45, 1.00, 0.90);
        let spread = assumed_spread(
            TradingPair::APT_USDC,
            TradingPair::APT_USDT,
            "dex_a",
            "dex_b",
            &prices,
        )
        .unwrap();
        assert_eq!(spread, 2.0);

        let spread = assumed_spread(
            TradingPair::APT_USDT,
            TradingPair::APT_USDC,
            "dex_a",
            "dex_b",
            &prices,
        )
        .unwrap();
        assert_eq!(spread, 2.0);
    }

    #[test]
    fn test_apt_usdt_to_apt_usdc_base() {
        let prices = PriceSet::new(12.45, 1.00, 1.00);
        let spread = assumed_spread(
            TradingPair::APT_USDT,
            TradingPair::APT_USDC,
            "dex_a",
            "dex_b",
            &prices,
        )
        .unwrap();
        assert!((spread - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_forward_spread_capped_at_three_percent() {
        // A wildly depegged stable pushes the rate difference past the cap
        let prices = PriceSet::new(12.45, 1.00, 0.50);
        let spread = assumed_spread(
            TradingPair::USDC_APT,
            TradingPair::USDT_APT,
            "dex_a",
            "dex_b",
            &prices,
        )
        .unwrap();
        assert_eq!(spread, 3.0);
    }

    #[test]
    fn test_fallback_minimal_spread_for_generic_venues() {
        // Distinct token sets, generic venues: minimal natural variance
        let spread = assumed_spread(
            TradingPair::USDC_APT,
            TradingPair::APT_USDT,
            "dex_a",
            "dex_b",
            &PriceSet::default(),
        )
        .unwrap();
        assert_eq!(spread, MINIMAL_SPREAD_PERCENT);
    }

    #[test]
    fn test_fallback_with_named_venue_spread() {
        let spread = assumed_spread(
            TradingPair::USDC_APT,
            TradingPair::APT_USDT,
            "pancakeswap",
            "liquidswap",
            &PriceSet::default(),
        )
        .unwrap();
        // 0.2 + |1.002 - 1.000| * 100
        assert!((spread - 0.4).abs() < 1e-9);
    }
}
