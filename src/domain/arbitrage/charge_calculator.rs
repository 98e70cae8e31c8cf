//! Trading fee, gas and slippage cost calculation

use serde::Serialize;

use crate::domain::dex::FeeSchedule;
use crate::shared::errors::ArbitrageError;
use crate::shared::types::{PriceSet, TokenSymbol, OCTAS_PER_APT};

/// On-chain operations with distinct gas footprints. Arbitrage routes only
/// exercise swaps, charged once per leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasOperation {
    Swap,
    AddLiquidity,
    RemoveLiquidity,
}

impl GasOperation {
    /// Gas units consumed by one operation
    pub fn gas_units(&self) -> u64 {
        match self {
            GasOperation::Swap => 1000,
            GasOperation::AddLiquidity => 2000,
            GasOperation::RemoveLiquidity => 2000,
        }
    }
}

/// Slippage estimation policies. The route analyzer and the investment
/// optimizer use different band tables; both are kept as-is because callers
/// depend on their distinct outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlippagePolicy {
    /// Four bands, used when evaluating a single route
    Standard,
    /// Five finer-grained bands, used by the investment optimizer
    Fine,
}

impl SlippagePolicy {
    /// Estimated slippage in percent for a USD trade amount.
    /// Non-decreasing in the trade amount within each policy.
    pub fn slippage_percent(&self, trade_amount: f64) -> f64 {
        match self {
            SlippagePolicy::Standard => {
                if trade_amount < 1000.0 {
                    0.02
                } else if trade_amount < 5000.0 {
                    0.05
                } else if trade_amount < 20000.0 {
                    0.15
                } else {
                    0.30
                }
            }
            SlippagePolicy::Fine => {
                if trade_amount < 1000.0 {
                    0.02
                } else if trade_amount < 5000.0 {
                    0.05
                } else if trade_amount < 25000.0 {
                    0.15
                } else if trade_amount < 100000.0 {
                    0.35
                } else {
                    0.75
                }
            }
        }
    }
}

/// Trading fee portion of the charge breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DexFeeCharges {
    pub from_dex_fee_percent: f64,
    pub to_dex_fee_percent: f64,
    pub from_fee_amount_usd: f64,
    pub to_fee_amount_usd: f64,
    pub total_trading_fees_usd: f64,
    pub fees_applied: bool,
}

/// Gas portion of the charge breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GasCharges {
    pub gas_unit_price_octas: u64,
    pub gas_units_per_swap: u64,
    pub operations: u32,
    pub total_gas_cost_apt: f64,
    pub total_gas_cost_usd: f64,
    pub apt_price_used: f64,
    pub gas_source: String,
}

/// Slippage portion of the charge breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlippageCharges {
    pub estimated_slippage_percent: f64,
    pub estimated_slippage_cost_usd: f64,
}

/// Full dollar-denominated cost breakdown for a two-leg arbitrage trade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeBreakdown {
    pub dex_fees: DexFeeCharges,
    pub gas_fees: GasCharges,
    pub slippage: SlippageCharges,
    pub total_costs_usd: f64,
    pub cost_percentage: f64,
}

/// Gas cost in APT for a single operation at the given unit price (octas)
pub fn gas_cost_apt(operation: GasOperation, gas_unit_price: u64) -> f64 {
    (operation.gas_units() * gas_unit_price) as f64 / OCTAS_PER_APT
}

/// Calculate all charges for a two-leg arbitrage trade.
///
/// The APT price from `prices` converts gas into USD; the same value must be
/// used for any other APT conversion within one evaluation, so it is taken
/// from the one `PriceSet` threaded through the whole call.
pub fn calculate_charges(
    trade_amount: f64,
    from_dex: &str,
    to_dex: &str,
    fees: &FeeSchedule,
    prices: &PriceSet,
    gas_unit_price: u64,
    gas_source: &str,
    slippage_policy: SlippagePolicy,
) -> Result<ChargeBreakdown, ArbitrageError> {
    if trade_amount <= 0.0 {
        return Err(ArbitrageError::InvalidTradeAmount(trade_amount));
    }
    prices.validate()?;

    let from_dex_fee = fees.resolve_fee(from_dex);
    let to_dex_fee = fees.resolve_fee(to_dex);
    let from_fee_amount = trade_amount * (from_dex_fee / 100.0);
    let to_fee_amount = trade_amount * (to_dex_fee / 100.0);
    let total_trading_fees = from_fee_amount + to_fee_amount;

    // One swap per leg, both priced at the same live gas unit price
    let operations = 2u32;
    let total_gas_cost_apt = gas_cost_apt(GasOperation::Swap, gas_unit_price) * operations as f64;
    let apt_price = prices.get(TokenSymbol::Apt);
    let total_gas_cost_usd = total_gas_cost_apt * apt_price;

    let slippage_percent = slippage_policy.slippage_percent(trade_amount);
    let slippage_cost = trade_amount * (slippage_percent / 100.0);

    let total_costs = total_trading_fees + total_gas_cost_usd + slippage_cost;

    Ok(ChargeBreakdown {
        dex_fees: DexFeeCharges {
            from_dex_fee_percent: from_dex_fee,
            to_dex_fee_percent: to_dex_fee,
            from_fee_amount_usd: from_fee_amount,
            to_fee_amount_usd: to_fee_amount,
            total_trading_fees_usd: total_trading_fees,
            fees_applied: from_dex_fee > 0.0 || to_dex_fee > 0.0,
        },
        gas_fees: GasCharges {
            gas_unit_price_octas: gas_unit_price,
            gas_units_per_swap: GasOperation::Swap.gas_units(),
            operations,
            total_gas_cost_apt,
            total_gas_cost_usd,
            apt_price_used: apt_price,
            gas_source: gas_source.to_string(),
        },
        slippage: SlippageCharges {
            estimated_slippage_percent: slippage_percent,
            estimated_slippage_cost_usd: slippage_cost,
        },
        total_costs_usd: total_costs,
        cost_percentage: (total_costs / trade_amount) * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_fees() -> FeeSchedule {
        FeeSchedule::new()
    }

    #[test]
    fn test_gas_only_charges() {
        let charges = calculate_charges(
            1000.0,
            "dex_a",
            "dex_b",
            &zero_fees(),
            &PriceSet::default(),
            100,
            "live",
            SlippagePolicy::Standard,
        )
        .unwrap();

        // 2 swaps x 1000 units x 100 octas = 200,000 octas = 0.002 APT
        assert_eq!(charges.gas_fees.total_gas_cost_apt, 0.002);
        assert!((charges.gas_fees.total_gas_cost_usd - 0.002 * 12.45).abs() < 1e-12);
        assert_eq!(charges.dex_fees.total_trading_fees_usd, 0.0);
        assert!(!charges.dex_fees.fees_applied);
    }

    #[test]
    fn test_gas_cost_linear_in_unit_price() {
        let at_100 = gas_cost_apt(GasOperation::Swap, 100);
        let at_200 = gas_cost_apt(GasOperation::Swap, 200);
        let at_400 = gas_cost_apt(GasOperation::Swap, 400);
        assert_eq!(at_200, at_100 * 2.0);
        assert_eq!(at_400, at_100 * 4.0);
    }

    #[test]
    fn test_trading_fees_sum_both_legs() {
        let fees: FeeSchedule = [("dexX", 0.25), ("dexY", 0.30)].into_iter().collect();
        let charges = calculate_charges(
            10000.0,
            "dexX",
            "dexY",
            &fees,
            &PriceSet::default(),
            100,
            "live",
            SlippagePolicy::Standard,
        )
        .unwrap();

        assert_eq!(charges.dex_fees.from_fee_amount_usd, 25.0);
        assert_eq!(charges.dex_fees.to_fee_amount_usd, 30.0);
        assert_eq!(charges.dex_fees.total_trading_fees_usd, 55.0);
        assert!(charges.dex_fees.fees_applied);
    }

    #[test]
    fn test_cost_percentage_identity() {
        let fees: FeeSchedule = [("Smart Contract", 0.25)].into_iter().collect();
        for amount in [1.0, 500.0, 4999.99, 5000.0, 20000.0, 125000.0] {
            let charges = calculate_charges(
                amount,
                "dex_a",
                "dex_b",
                &fees,
                &PriceSet::default(),
                120,
                "live",
                SlippagePolicy::Standard,
            )
            .unwrap();
            assert!(charges.total_costs_usd >= 0.0);
            assert_eq!(
                charges.cost_percentage,
                charges.total_costs_usd / amount * 100.0
            );
        }
    }

    #[test]
    fn test_non_positive_trade_amount_fails_fast() {
        for amount in [0.0, -100.0] {
            let result = calculate_charges(
                amount,
                "dex_a",
                "dex_b",
                &zero_fees(),
                &PriceSet::default(),
                100,
                "live",
                SlippagePolicy::Standard,
            );
            assert!(matches!(
                result,
                Err(ArbitrageError::InvalidTradeAmount(_))
            ));
        }
    }

    #[test]
    fn test_invalid_price_rejected() {
        let prices = PriceSet::new(12.45, -1.0, 0.999);
        let result = calculate_charges(
            1000.0,
            "dex_a",
            "dex_b",
            &zero_fees(),
            &prices,
            100,
            "live",
            SlippagePolicy::Standard,
        );
        assert!(matches!(result, Err(ArbitrageError::InvalidPrice { .. })));
    }

    #[test]
    fn test_standard_slippage_bands() {
        let policy = SlippagePolicy::Standard;
        assert_eq!(policy.slippage_percent(999.99), 0.02);
        assert_eq!(policy.slippage_percent(1000.0), 0.05);
        assert_eq!(policy.slippage_percent(4999.99), 0.05);
        assert_eq!(policy.slippage_percent(5000.0), 0.15);
        assert_eq!(policy.slippage_percent(19999.99), 0.15);
        assert_eq!(policy.slippage_percent(20000.0), 0.30);
    }

    #[test]
    fn test_fine_slippage_bands() {
        let policy = SlippagePolicy::Fine;
        assert_eq!(policy.slippage_percent(500.0), 0.02);
        assert_eq!(policy.slippage_percent(4000.0), 0.05);
        assert_eq!(policy.slippage_percent(24999.0), 0.15);
        assert_eq!(policy.slippage_percent(25000.0), 0.35);
        assert_eq!(policy.slippage_percent(99999.0), 0.35);
        assert_eq!(policy.slippage_percent(100000.0), 0.75);
    }

    #[test]
    fn test_slippage_monotonicity() {
        for policy in [SlippagePolicy::Standard, SlippagePolicy::Fine] {
            let mut last_cost = 0.0;
            for amount in [10.0, 999.0, 1001.0, 4999.0, 5001.0, 19999.0, 24999.0, 99999.0, 200000.0]
            {
                let cost = amount * policy.slippage_percent(amount) / 100.0;
                assert!(
                    cost >= last_cost,
                    "slippage cost decreased at amount {}",
                    amount
                );
                last_cost = cost;
            }
        }
    }
}
