//! Investment-size optimization over a fixed ladder of APT amounts
//!
//! The optimizer carries its own simplified cost model: gas is expressed in
//! APT per swap instead of live gas units, fees come from directional keys,
//! slippage uses the finer five-band table and the spread is a flat
//! token-direction table. These duplicates are intentionally separate from
//! the route analyzer's model; unifying them would change its outputs.

use serde::Serialize;
use tracing::debug;

use crate::domain::arbitrage::charge_calculator::SlippagePolicy;
use crate::domain::arbitrage::profit_calculator::RiskTier;
use crate::domain::dex::FeeSchedule;
use crate::shared::errors::ArbitrageError;
use crate::shared::types::{PriceSet, TokenSymbol};

/// Candidate investment sizes in APT, scanned in ascending order
pub const APT_TEST_LADDER: [f64; 20] = [
    1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 1500.0, 2000.0, 3000.0,
    5000.0, 7500.0, 10000.0, 15000.0, 20000.0, 30000.0, 50000.0,
];

/// Gas cost in APT per swap under the optimizer's flat cost model
pub const GAS_APT_PER_SWAP: f64 = 0.001;

/// Default leg fees in percent when the schedule lacks directional keys
const DEFAULT_FROM_FEE: f64 = 0.25;
const DEFAULT_TO_FEE: f64 = 0.30;

const BREAKEVEN_MIN_APT: f64 = 1.0;
const BREAKEVEN_MAX_APT: f64 = 100000.0;
const BREAKEVEN_MAX_ITERATIONS: usize = 20;
const BREAKEVEN_TOLERANCE_USD: f64 = 0.01;

/// Cost components behind a per-amount profit estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountCostBreakdown {
    pub gross_profit: f64,
    pub trading_fees: f64,
    pub gas_costs: f64,
    pub slippage_costs: f64,
    pub price_difference_percent: f64,
}

/// Profit estimate for one investment amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountProfit {
    pub is_profitable: bool,
    pub net_profit_usd: f64,
    pub profit_margin_percent: f64,
    pub roi_percent: f64,
    pub total_costs_usd: f64,
    pub risk_level: RiskTier,
    pub breakdown: AmountCostBreakdown,
}

/// A profitable ladder entry with its risk-adjusted score
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationCandidate {
    pub apt_investment: f64,
    pub usd_investment: f64,
    pub net_profit_usd: f64,
    pub profit_margin_percent: f64,
    pub roi_percent: f64,
    pub total_costs_usd: f64,
    pub risk_level: RiskTier,
    pub combined_score: f64,
}

/// The recommended investment with generated reasoning
#[derive(Debug, Clone, Serialize)]
pub struct OptimalInvestment {
    pub recommended_apt_investment: f64,
    pub recommended_usd_investment: f64,
    pub expected_profit_usd: f64,
    pub expected_profit_margin: f64,
    pub expected_roi: f64,
    pub risk_level: RiskTier,
    pub total_costs: f64,
    pub combined_score: f64,
    pub reasoning: String,
}

/// Scan parameters echoed back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationParameters {
    pub from_token: String,
    pub to_token: String,
    pub max_investment_apt: f64,
    pub amounts_tested: usize,
    pub profitable_amounts: usize,
}

/// Market conditions the scan ran under
#[derive(Debug, Clone, Serialize)]
pub struct MarketConditions {
    pub apt_price_usd: f64,
    pub price_spread_available: f64,
    pub gas_cost_apt: f64,
    pub gas_cost_usd: f64,
}

/// Full result of a ladder scan
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationOutcome {
    pub optimization: OptimizationParameters,
    pub optimal_investment: Option<OptimalInvestment>,
    pub all_profitable_options: Vec<OptimizationCandidate>,
    pub market_conditions: MarketConditions,
    pub recommendations: Vec<String>,
}

/// Analysis of one specific investment amount
#[derive(Debug, Clone, Serialize)]
pub struct AmountAnalysis {
    pub apt_investment: f64,
    pub usd_investment: f64,
    pub profit: AmountProfit,
    pub recommendation: &'static str,
}

/// Break-even search result
#[derive(Debug, Clone, Serialize)]
pub struct BreakevenOutcome {
    pub breakeven_apt_amount: Option<f64>,
    pub breakeven_usd_amount: Option<f64>,
    pub found: bool,
    pub price_spread_percent: f64,
    pub minimum_spread_needed: f64,
}

/// Flat spread table keyed by trade direction
pub fn token_pair_spread(from_token: TokenSymbol, to_token: TokenSymbol) -> f64 {
    match (from_token, to_token) {
        (TokenSymbol::Usdc, TokenSymbol::Usdt) => 1.2,
        (TokenSymbol::Usdt, TokenSymbol::Usdc) => 1.1,
        (from, to) if from == TokenSymbol::Apt || to == TokenSymbol::Apt => 0.9,
        _ => 0.7,
    }
}

/// Optimizer risk policy. Same thresholds as the route analyzer's, kept as a
/// separate function so either table can move independently.
pub fn assess_risk_tier(profit_margin: f64, trade_amount_usd: f64) -> RiskTier {
    if profit_margin > 1.0 && trade_amount_usd < 10000.0 {
        RiskTier::Low
    } else if profit_margin > 0.5 && trade_amount_usd < 50000.0 {
        RiskTier::Medium
    } else if profit_margin > 0.2 {
        RiskTier::High
    } else {
        RiskTier::VeryHigh
    }
}

/// Ladder entries not exceeding the cap, deduplicated and ascending
pub fn ladder_amounts(max_investment_apt: f64) -> Vec<f64> {
    let mut amounts: Vec<f64> = APT_TEST_LADDER
        .iter()
        .copied()
        .filter(|amount| *amount <= max_investment_apt)
        .collect();
    amounts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    amounts.dedup();
    amounts
}

fn leg_fees(fees: &FeeSchedule) -> (f64, f64) {
    (
        fees.get("from_dex").unwrap_or(DEFAULT_FROM_FEE),
        fees.get("to_dex").unwrap_or(DEFAULT_TO_FEE),
    )
}

/// Profit estimate for a specific APT investment under the optimizer's cost
/// model. Prices are threaded in per call; nothing is cached in between.
pub fn profit_for_amount(
    apt_amount: f64,
    from_token: TokenSymbol,
    to_token: TokenSymbol,
    fees: &FeeSchedule,
    prices: &PriceSet,
) -> Result<AmountProfit, ArbitrageError> {
    if apt_amount <= 0.0 {
        return Err(ArbitrageError::InvalidTradeAmount(apt_amount));
    }
    prices.validate()?;

    let apt_price = prices.get(TokenSymbol::Apt);
    let trade_amount_usd = apt_amount * apt_price;

    let (from_fee, to_fee) = leg_fees(fees);
    let trading_fees =
        trade_amount_usd * (from_fee / 100.0) + trade_amount_usd * (to_fee / 100.0);

    let gas_cost_apt = GAS_APT_PER_SWAP * 2.0;
    let gas_costs = gas_cost_apt * apt_price;

    let slippage_percent = SlippagePolicy::Fine.slippage_percent(trade_amount_usd);
    let slippage_costs = trade_amount_usd * (slippage_percent / 100.0);

    let total_costs = trading_fees + gas_costs + slippage_costs;

    let price_difference = token_pair_spread(from_token, to_token);
    let gross_profit = trade_amount_usd * (price_difference / 100.0);
    let net_profit = gross_profit - total_costs;
    let is_profitable = net_profit > 0.0;
    let profit_margin = (net_profit / trade_amount_usd) * 100.0;

    Ok(AmountProfit {
        is_profitable,
        net_profit_usd: net_profit,
        profit_margin_percent: profit_margin,
        roi_percent: profit_margin,
        total_costs_usd: total_costs,
        risk_level: assess_risk_tier(profit_margin, trade_amount_usd),
        breakdown: AmountCostBreakdown {
            gross_profit,
            trading_fees,
            gas_costs,
            slippage_costs,
            price_difference_percent: price_difference,
        },
    })
}

fn size_descriptor(apt_amount: f64) -> &'static str {
    if apt_amount < 100.0 {
        "small"
    } else if apt_amount < 1000.0 {
        "medium"
    } else if apt_amount < 5000.0 {
        "large"
    } else {
        "very large"
    }
}

fn generate_reasoning(candidate: &OptimizationCandidate) -> String {
    format!(
        "Optimal {} investment of {} APT provides {:.3}% profit margin with {} risk. \
         This balance maximizes returns while managing exposure.",
        size_descriptor(candidate.apt_investment),
        candidate.apt_investment,
        candidate.profit_margin_percent,
        candidate.risk_level.as_str().to_lowercase()
    )
}

fn generate_recommendations(candidates: &[OptimizationCandidate]) -> Vec<String> {
    let mut recommendations = Vec::new();

    if candidates.is_empty() {
        recommendations
            .push("No profitable opportunities found with current market conditions".to_string());
        recommendations
            .push("Consider waiting for better price spreads or lower gas fees".to_string());
        return recommendations;
    }

    let count = candidates.len();
    let avg_margin =
        candidates.iter().map(|c| c.profit_margin_percent).sum::<f64>() / count as f64;
    let best_margin = candidates
        .iter()
        .map(|c| c.profit_margin_percent)
        .fold(f64::MIN, f64::max);

    recommendations.push(format!("Found {} profitable investment amounts", count));
    recommendations.push(format!("Average profit margin: {:.3}%", avg_margin));
    recommendations.push(format!("Best profit margin: {:.3}%", best_margin));

    let low_risk_count = candidates
        .iter()
        .filter(|c| c.risk_level == RiskTier::Low)
        .count();
    if low_risk_count > 0 {
        recommendations.push(format!("{} low-risk opportunities available", low_risk_count));
    }

    let best_small = candidates
        .iter()
        .filter(|c| c.apt_investment < 100.0)
        .max_by(|a, b| {
            a.profit_margin_percent
                .partial_cmp(&b.profit_margin_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(best) = best_small {
        recommendations.push(format!(
            "Best small investment: {} APT ({:.3}% margin)",
            best.apt_investment, best.profit_margin_percent
        ));
    }

    let best_large = candidates
        .iter()
        .filter(|c| c.apt_investment > 1000.0)
        .max_by(|a, b| {
            a.profit_margin_percent
                .partial_cmp(&b.profit_margin_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(best) = best_large {
        recommendations.push(format!(
            "Best large investment: {} APT ({:.3}% margin)",
            best.apt_investment, best.profit_margin_percent
        ));
    }

    recommendations
}

/// Scan the investment ladder and recommend the size with the best
/// risk-adjusted return (margin divided by risk weight).
pub fn optimize_investment(
    from_token: TokenSymbol,
    to_token: TokenSymbol,
    fees: &FeeSchedule,
    prices: &PriceSet,
    max_investment_apt: f64,
) -> Result<OptimizationOutcome, ArbitrageError> {
    prices.validate()?;
    let apt_price = prices.get(TokenSymbol::Apt);
    let amounts = ladder_amounts(max_investment_apt);
    debug!(
        "Optimizing {} -> {} over {} candidate amounts",
        from_token,
        to_token,
        amounts.len()
    );

    let mut candidates = Vec::new();
    for apt_amount in &amounts {
        let profit = profit_for_amount(*apt_amount, from_token, to_token, fees, prices)?;
        if profit.is_profitable {
            let combined_score = profit.profit_margin_percent / profit.risk_level.weight();
            candidates.push(OptimizationCandidate {
                apt_investment: *apt_amount,
                usd_investment: apt_amount * apt_price,
                net_profit_usd: profit.net_profit_usd,
                profit_margin_percent: profit.profit_margin_percent,
                roi_percent: profit.roi_percent,
                total_costs_usd: profit.total_costs_usd,
                risk_level: profit.risk_level,
                combined_score,
            });
        }
    }

    // Ranked by raw margin for the listing; the recommendation itself is
    // chosen by risk-adjusted score
    candidates.sort_by(|a, b| {
        b.profit_margin_percent
            .partial_cmp(&a.profit_margin_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let optimal_investment = candidates
        .iter()
        .max_by(|a, b| {
            a.combined_score
                .partial_cmp(&b.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|best| OptimalInvestment {
            recommended_apt_investment: best.apt_investment,
            recommended_usd_investment: best.usd_investment,
            expected_profit_usd: best.net_profit_usd,
            expected_profit_margin: best.profit_margin_percent,
            expected_roi: best.roi_percent,
            risk_level: best.risk_level,
            total_costs: best.total_costs_usd,
            combined_score: best.combined_score,
            reasoning: generate_reasoning(best),
        });

    let recommendations = generate_recommendations(&candidates);
    let profitable_amounts = candidates.len();
    candidates.truncate(10);

    Ok(OptimizationOutcome {
        optimization: OptimizationParameters {
            from_token: from_token.as_str().to_uppercase(),
            to_token: to_token.as_str().to_uppercase(),
            max_investment_apt,
            amounts_tested: amounts.len(),
            profitable_amounts,
        },
        optimal_investment,
        all_profitable_options: candidates,
        market_conditions: MarketConditions {
            apt_price_usd: apt_price,
            price_spread_available: token_pair_spread(from_token, to_token),
            gas_cost_apt: GAS_APT_PER_SWAP * 2.0,
            gas_cost_usd: GAS_APT_PER_SWAP * 2.0 * apt_price,
        },
        recommendations,
    })
}

/// Analyze one specific APT investment amount
pub fn analyze_amount(
    apt_amount: f64,
    from_token: TokenSymbol,
    to_token: TokenSymbol,
    fees: &FeeSchedule,
    prices: &PriceSet,
) -> Result<AmountAnalysis, ArbitrageError> {
    let profit = profit_for_amount(apt_amount, from_token, to_token, fees, prices)?;
    let apt_price = prices.get(TokenSymbol::Apt);
    let recommendation = if profit.is_profitable && profit.profit_margin_percent > 0.5 {
        "EXECUTE"
    } else {
        "SKIP"
    };

    Ok(AmountAnalysis {
        apt_investment: apt_amount,
        usd_investment: apt_amount * apt_price,
        profit,
        recommendation,
    })
}

/// Bisect the investment size for the point where net profit crosses zero.
/// Reports not-found when the tolerance is not reached within the iteration
/// budget instead of returning a misleading midpoint.
pub fn find_breakeven(
    from_token: TokenSymbol,
    to_token: TokenSymbol,
    fees: &FeeSchedule,
    prices: &PriceSet,
) -> Result<BreakevenOutcome, ArbitrageError> {
    prices.validate()?;
    let apt_price = prices.get(TokenSymbol::Apt);

    let mut min_apt = BREAKEVEN_MIN_APT;
    let mut max_apt = BREAKEVEN_MAX_APT;
    let mut breakeven_apt = None;

    for _ in 0..BREAKEVEN_MAX_ITERATIONS {
        let mid_apt = (min_apt + max_apt) / 2.0;
        let profit = profit_for_amount(mid_apt, from_token, to_token, fees, prices)?;

        if profit.net_profit_usd.abs() < BREAKEVEN_TOLERANCE_USD {
            breakeven_apt = Some(mid_apt);
            break;
        } else if profit.net_profit_usd < 0.0 {
            min_apt = mid_apt;
        } else {
            max_apt = mid_apt;
        }
    }

    Ok(BreakevenOutcome {
        breakeven_apt_amount: breakeven_apt,
        breakeven_usd_amount: breakeven_apt.map(|apt| apt * apt_price),
        found: breakeven_apt.is_some(),
        price_spread_percent: token_pair_spread(from_token, to_token),
        minimum_spread_needed: 0.6,
    })
}
