//! Profitability evaluation for arbitrage routes

use serde::Serialize;

use super::charge_calculator::{calculate_charges, ChargeBreakdown, SlippagePolicy};
use super::spread_model::assumed_spread;
use crate::domain::dex::FeeSchedule;
use crate::shared::errors::ArbitrageError;
use crate::shared::types::{PriceSet, Route};

/// Coarse risk bucket derived from profit margin and trade size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::VeryHigh => "VERY_HIGH",
        }
    }

    /// Weight used for risk-adjusted scoring (lower is better)
    pub fn weight(&self) -> f64 {
        match self {
            RiskTier::Low => 1.0,
            RiskTier::Medium => 2.0,
            RiskTier::High => 3.0,
            RiskTier::VeryHigh => 4.0,
        }
    }
}

/// Trading recommendation for an evaluated route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Execute,
    Skip,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Execute => "EXECUTE",
            Recommendation::Skip => "SKIP",
        }
    }
}

/// Profitability numbers for a single route at a fixed trade size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitabilityResult {
    pub is_profitable: bool,
    pub price_difference_percent: f64,
    pub gross_profit_usd: f64,
    pub total_costs_usd: f64,
    pub net_profit_usd: f64,
    pub profit_margin_percent: f64,
    pub roi_percent: f64,
}

/// A route together with its full evaluation
#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedRoute {
    pub route: Route,
    pub charges: ChargeBreakdown,
    pub profitability: ProfitabilityResult,
    pub risk_level: RiskTier,
    pub recommendation: Recommendation,
}

/// Risk tier for a single-route evaluation. Comparisons are strict:
/// a margin of exactly 1.0 or 0.5 or 0.2 falls to the lower tier.
pub fn risk_tier(profit_margin: f64, trade_amount: f64) -> RiskTier {
    if profit_margin > 1.0 && trade_amount < 10000.0 {
        RiskTier::Low
    } else if profit_margin > 0.5 && trade_amount < 50000.0 {
        RiskTier::Medium
    } else if profit_margin > 0.2 {
        RiskTier::High
    } else {
        RiskTier::VeryHigh
    }
}

/// Execute only when the trade is profitable with a margin above 0.5%
pub fn recommendation(is_profitable: bool, profit_margin: f64) -> Recommendation {
    if is_profitable && profit_margin > 0.5 {
        Recommendation::Execute
    } else {
        Recommendation::Skip
    }
}

/// Evaluate a route end to end: spread, charges, profit, risk, verdict.
///
/// An impossible round trip or an invalid price surfaces as an error, never
/// as a near-zero numeric result.
pub fn evaluate_route(
    route: &Route,
    fees: &FeeSchedule,
    prices: &PriceSet,
    gas_unit_price: u64,
    gas_source: &str,
) -> Result<EvaluatedRoute, ArbitrageError> {
    let spread = assumed_spread(
        route.from_pair,
        route.to_pair,
        &route.from_dex,
        &route.to_dex,
        prices,
    )?;
    let charges = calculate_charges(
        route.trade_amount,
        &route.from_dex,
        &route.to_dex,
        fees,
        prices,
        gas_unit_price,
        gas_source,
        SlippagePolicy::Standard,
    )?;

    let total_costs = charges.total_costs_usd;
    let gross_profit = route.trade_amount * (spread / 100.0);
    let net_profit = gross_profit - total_costs;
    let is_profitable = net_profit > 0.0;
    let profit_margin = (net_profit / route.trade_amount) * 100.0;

    let risk_level = risk_tier(profit_margin, route.trade_amount);
    let recommendation = recommendation(is_profitable, profit_margin);

    Ok(EvaluatedRoute {
        route: route.clone(),
        charges,
        profitability: ProfitabilityResult {
            is_profitable,
            price_difference_percent: spread,
            total_costs_usd: total_costs,
            gross_profit_usd: gross_profit,
            net_profit_usd: net_profit,
            profit_margin_percent: profit_margin,
            roi_percent: profit_margin,
        },
        risk_level,
        recommendation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::TradingPair;

    fn route(trade_amount: f64) -> Route {
        Route {
            from_pair: TradingPair::USDC_APT,
            to_pair: TradingPair::USDT_APT,
            from_dex: "dex_a".to_string(),
            to_dex: "dex_b".to_string(),
            trade_amount,
        }
    }

    #[test]
    fn test_risk_tier_boundaries_fall_to_lower_tier() {
        assert_eq!(risk_tier(1.01, 1000.0), RiskTier::Low);
        assert_eq!(risk_tier(1.0, 1000.0), RiskTier::Medium);
        assert_eq!(risk_tier(0.51, 1000.0), RiskTier::Medium);
        assert_eq!(risk_tier(0.5, 1000.0), RiskTier::High);
        assert_eq!(risk_tier(0.21, 1000.0), RiskTier::High);
        assert_eq!(risk_tier(0.2, 1000.0), RiskTier::VeryHigh);
    }

    #[test]
    fn test_risk_tier_trade_size_gates() {
        assert_eq!(risk_tier(1.5, 9999.0), RiskTier::Low);
        assert_eq!(risk_tier(1.5, 10000.0), RiskTier::Medium);
        assert_eq!(risk_tier(0.8, 49999.0), RiskTier::Medium);
        assert_eq!(risk_tier(0.8, 50000.0), RiskTier::High);
    }

    #[test]
    fn test_recommendation_threshold() {
        assert_eq!(recommendation(true, 0.51), Recommendation::Execute);
        assert_eq!(recommendation(true, 0.5), Recommendation::Skip);
        assert_eq!(recommendation(false, 2.0), Recommendation::Skip);
    }

    #[test]
    fn test_end_to_end_zero_fee_route() {
        let prices = PriceSet::new(12.45, 1.00, 0.999);
        let evaluated =
            evaluate_route(&route(1000.0), &FeeSchedule::new(), &prices, 100, "live").unwrap();

        let spread = evaluated.profitability.price_difference_percent;
        let usdc_apt_rate: f64 = 12.45 / 1.00;
        let usdt_apt_rate: f64 = 12.45 / 0.999;
        let rate_diff = (usdc_apt_rate - usdt_apt_rate).abs() / usdc_apt_rate * 100.0;
        assert!((spread - (0.6 + rate_diff * 0.1)).abs() < 1e-12);

        // Zero fees: cost is gas plus slippage only
        let gas_usd = 2.0 * 1000.0 * 100.0 / 100_000_000.0 * 12.45;
        let slippage_usd = 1000.0 * 0.05 / 100.0;
        assert!((evaluated.charges.total_costs_usd - (gas_usd + slippage_usd)).abs() < 1e-12);

        let gross = 1000.0 * spread / 100.0;
        assert!((evaluated.profitability.gross_profit_usd - gross).abs() < 1e-12);
        assert!(
            (evaluated.profitability.net_profit_usd - (gross - evaluated.charges.total_costs_usd))
                .abs()
                < 1e-12
        );
        assert!(evaluated.profitability.is_profitable);
        assert_eq!(evaluated.recommendation, Recommendation::Execute);
    }

    #[test]
    fn test_identical_generic_dexes_round_trip_is_error() {
        let mut r = route(1000.0);
        r.to_pair = TradingPair::APT_USDC;
        r.from_dex = "dex_a".to_string();
        r.to_dex = "dex_a".to_string();

        let result = evaluate_route(&r, &FeeSchedule::new(), &PriceSet::default(), 100, "live");
        assert!(matches!(result, Err(ArbitrageError::ImpossibleRoute { .. })));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let fees: FeeSchedule = [("dexX", 0.25), ("dexY", 0.30)].into_iter().collect();
        let mut r = route(5000.0);
        r.from_dex = "dexX".to_string();
        r.to_dex = "dexY".to_string();
        let prices = PriceSet::default();

        let first = evaluate_route(&r, &fees, &prices, 150, "live").unwrap();
        let second = evaluate_route(&r, &fees, &prices, 150, "live").unwrap();
        assert_eq!(first.profitability, second.profitability);
        assert_eq!(first.charges, second.charges);
    }
}
