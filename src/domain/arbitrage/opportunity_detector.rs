//! Exhaustive enumeration of arbitrage opportunities across pair and DEX
//! combinations

use serde::Serialize;
use tracing::debug;

use super::profit_calculator::{evaluate_route, ProfitabilityResult, Recommendation, RiskTier};
use crate::domain::dex::FeeSchedule;
use crate::shared::errors::ArbitrageError;
use crate::shared::types::{PriceSet, Route, TradingPair};
use crate::shared::utils;

/// The four canonical pair-direction combinations worth scanning
pub const PAIR_COMBINATIONS: [(TradingPair, TradingPair); 4] = [
    (TradingPair::USDC_APT, TradingPair::USDT_APT),
    (TradingPair::USDT_APT, TradingPair::USDC_APT),
    (TradingPair::APT_USDC, TradingPair::APT_USDT),
    (TradingPair::APT_USDT, TradingPair::APT_USDC),
];

/// Number of ranked opportunities returned to the caller
const TOP_OPPORTUNITIES: usize = 10;

/// A profitable route found during a scan
#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    pub id: String,
    pub route: Route,
    pub profitability: ProfitabilityResult,
    pub risk_level: RiskTier,
    pub recommendation: Recommendation,
}

/// Echo of the scan inputs
#[derive(Debug, Clone, Serialize)]
pub struct SearchParameters {
    pub trade_amount: f64,
    pub pairs_checked: usize,
    pub available_dexs: Vec<String>,
    pub current_prices: PriceSet,
}

/// Ranked scan results
#[derive(Debug, Clone, Serialize)]
pub struct OpportunitySet {
    pub total_found: usize,
    pub profitable_count: usize,
    pub top_opportunities: Vec<Opportunity>,
}

/// Aggregate statistics over the ranked opportunities
#[derive(Debug, Clone, Serialize)]
pub struct MarketSummary {
    pub best_profit_margin: f64,
    pub average_profit_margin: f64,
    pub recommended_trades: usize,
}

/// Complete result of an opportunity scan
#[derive(Debug, Clone, Serialize)]
pub struct OpportunityScan {
    pub search_parameters: SearchParameters,
    pub opportunities: OpportunitySet,
    pub market_summary: MarketSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Evaluate every pair direction across every ordered pair of distinct DEXs
/// from the fee schedule, rank the profitable ones by margin and keep the
/// top entries.
///
/// Impossible round-trip combinations are skipped rather than failing the
/// whole scan; invalid input aborts it.
pub fn find_possibilities(
    trade_amount: f64,
    fees: &FeeSchedule,
    prices: &PriceSet,
    gas_unit_price: u64,
    gas_source: &str,
) -> Result<OpportunityScan, ArbitrageError> {
    if trade_amount <= 0.0 {
        return Err(ArbitrageError::InvalidTradeAmount(trade_amount));
    }
    prices.validate()?;

    let available_dexs = fees.available_dexes();
    if available_dexs.is_empty() {
        return Ok(OpportunityScan {
            search_parameters: SearchParameters {
                trade_amount,
                pairs_checked: 0,
                available_dexs,
                current_prices: *prices,
            },
            opportunities: OpportunitySet {
                total_found: 0,
                profitable_count: 0,
                top_opportunities: Vec::new(),
            },
            market_summary: MarketSummary {
                best_profit_margin: 0.0,
                average_profit_margin: 0.0,
                recommended_trades: 0,
            },
            message: Some(
                "No DEXs provided in input. Please specify DEX fees to analyze opportunities."
                    .to_string(),
            ),
        });
    }

    let mut opportunities = Vec::new();

    for (from_pair, to_pair) in PAIR_COMBINATIONS {
        for from_dex in &available_dexs {
            for to_dex in &available_dexs {
                if from_dex == to_dex {
                    continue;
                }
                let route = Route {
                    from_pair,
                    to_pair,
                    from_dex: from_dex.clone(),
                    to_dex: to_dex.clone(),
                    trade_amount,
                };
                match evaluate_route(&route, fees, prices, gas_unit_price, gas_source) {
                    Ok(evaluated) if evaluated.profitability.is_profitable => {
                        opportunities.push(Opportunity {
                            id: utils::generate_id(),
                            route: evaluated.route,
                            profitability: evaluated.profitability,
                            risk_level: evaluated.risk_level,
                            recommendation: evaluated.recommendation,
                        });
                    }
                    Ok(_) => {}
                    Err(ArbitrageError::ImpossibleRoute { .. }) => {
                        debug!(
                            "Skipping impossible combination {} -> {} ({} vs {})",
                            from_pair, to_pair, from_dex, to_dex
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    opportunities.sort_by(|a, b| {
        b.profitability
            .profit_margin_percent
            .partial_cmp(&a.profitability.profit_margin_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total_found = opportunities.len();
    let profitable_count = opportunities.len();
    opportunities.truncate(TOP_OPPORTUNITIES);

    let best_profit_margin = opportunities
        .first()
        .map(|o| o.profitability.profit_margin_percent)
        .unwrap_or(0.0);
    let average_profit_margin = if opportunities.is_empty() {
        0.0
    } else {
        opportunities
            .iter()
            .map(|o| o.profitability.profit_margin_percent)
            .sum::<f64>()
            / opportunities.len() as f64
    };
    let recommended_trades = opportunities
        .iter()
        .filter(|o| o.recommendation == Recommendation::Execute)
        .count();

    Ok(OpportunityScan {
        search_parameters: SearchParameters {
            trade_amount,
            pairs_checked: PAIR_COMBINATIONS.len()
                * available_dexs.len()
                * (available_dexs.len() - 1),
            available_dexs,
            current_prices: *prices,
        },
        opportunities: OpportunitySet {
            total_found,
            profitable_count,
            top_opportunities: opportunities,
        },
        market_summary: MarketSummary {
            best_profit_margin,
            average_profit_margin,
            recommended_trades,
        },
        message: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_dexes_yields_guidance_message() {
        let scan =
            find_possibilities(5000.0, &FeeSchedule::new(), &PriceSet::default(), 100, "live")
                .unwrap();
        assert_eq!(scan.opportunities.total_found, 0);
        assert_eq!(scan.search_parameters.pairs_checked, 0);
        assert!(scan.message.unwrap().contains("No DEXs provided"));
    }

    #[test]
    fn test_two_dexes_check_eight_combinations() {
        let fees: FeeSchedule = [("dexX", 0.25), ("dexY", 0.30)].into_iter().collect();
        let scan =
            find_possibilities(5000.0, &fees, &PriceSet::default(), 100, "live").unwrap();

        // 4 pair directions x 2 ordered DEX permutations
        assert_eq!(scan.search_parameters.pairs_checked, 8);
        assert!(scan.opportunities.top_opportunities.len() <= 8);

        let margins: Vec<f64> = scan
            .opportunities
            .top_opportunities
            .iter()
            .map(|o| o.profitability.profit_margin_percent)
            .collect();
        for pair in margins.windows(2) {
            assert!(pair[0] >= pair[1], "opportunities not sorted by margin");
        }
    }

    #[test]
    fn test_generic_fee_schedule_scans_placeholder_venues() {
        // A lone generic fee denotes two placeholder venues; every canonical
        // combination crosses token sets, so the scan completes normally
        let fees: FeeSchedule = [("Smart Contract", 0.25)].into_iter().collect();
        let scan =
            find_possibilities(1000.0, &fees, &PriceSet::default(), 100, "live").unwrap();

        assert_eq!(
            scan.search_parameters.available_dexs,
            vec!["dex_a".to_string(), "dex_b".to_string()]
        );
        assert_eq!(scan.search_parameters.pairs_checked, 8);
        for opportunity in &scan.opportunities.top_opportunities {
            assert!(!opportunity
                .route
                .from_pair
                .same_token_set(&opportunity.route.to_pair));
        }
    }

    #[test]
    fn test_summary_consistency() {
        let fees: FeeSchedule = [("dexX", 0.05), ("dexY", 0.10)].into_iter().collect();
        let scan =
            find_possibilities(1000.0, &fees, &PriceSet::default(), 100, "live").unwrap();

        let top = &scan.opportunities.top_opportunities;
        if let Some(first) = top.first() {
            assert_eq!(
                scan.market_summary.best_profit_margin,
                first.profitability.profit_margin_percent
            );
        }
        let recommended = top
            .iter()
            .filter(|o| o.recommendation == Recommendation::Execute)
            .count();
        assert_eq!(scan.market_summary.recommended_trades, recommended);
        assert_eq!(
            scan.opportunities.total_found,
            scan.opportunities.profitable_count
        );
    }

    #[test]
    fn test_invalid_trade_amount_aborts_scan() {
        let fees: FeeSchedule = [("dexX", 0.25), ("dexY", 0.30)].into_iter().collect();
        let result = find_possibilities(0.0, &fees, &PriceSet::default(), 100, "live");
        assert!(matches!(
            result,
            Err(ArbitrageError::InvalidTradeAmount(_))
        ));
    }
}
