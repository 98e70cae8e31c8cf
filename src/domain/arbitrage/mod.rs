//! Arbitrage domain - cost model, spread heuristic, profitability and
//! opportunity enumeration

pub mod charge_calculator;
pub mod opportunity_detector;
pub mod profit_calculator;
pub mod spread_model;

pub use charge_calculator::{
    calculate_charges, gas_cost_apt, ChargeBreakdown, GasOperation, SlippagePolicy,
};
pub use opportunity_detector::{find_possibilities, Opportunity, OpportunityScan};
pub use profit_calculator::{
    evaluate_route, EvaluatedRoute, ProfitabilityResult, Recommendation, RiskTier,
};
pub use spread_model::assumed_spread;
