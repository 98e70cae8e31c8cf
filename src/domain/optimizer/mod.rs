//! Optimizer domain - investment-size optimization

pub mod investment_optimizer;

pub use investment_optimizer::{
    analyze_amount, find_breakeven, ladder_amounts, optimize_investment, AmountAnalysis,
    BreakevenOutcome, OptimizationCandidate, OptimizationOutcome, APT_TEST_LADDER,
};
