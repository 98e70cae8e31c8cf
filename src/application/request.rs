//! Request payloads and action dispatch
//!
//! Callers address the engine through a tagged request enum; the action tag
//! is resolved once at the boundary instead of string-matching deep inside
//! the computation.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::dex::FeeSchedule;
use crate::shared::errors::{AppError, ArbitrageError};
use crate::shared::types::{PriceSet, Route, TokenSymbol, TradingPair};

/// Action identifiers accepted at the request boundary
pub const KNOWN_ACTIONS: [&str; 6] = [
    "getcharges",
    "isprofitable",
    "possibilities",
    "optimize_investment",
    "analyze_amount",
    "find_breakeven",
];

/// Route-oriented request (charges and profitability checks)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouteRequest {
    pub from_pair: Option<TradingPair>,
    pub to_pair: Option<TradingPair>,
    pub from_dex: Option<String>,
    pub to_dex: Option<String>,
    pub trade_amount: Option<f64>,
    pub amount_apt: Option<f64>,
    pub amount_usd: Option<f64>,
    pub dex_fees: Option<FeeSchedule>,
    pub current_prices: Option<HashMap<String, f64>>,
    pub apt_price: Option<f64>,
}

/// Opportunity scan request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanRequest {
    pub trade_amount: Option<f64>,
    pub amount_apt: Option<f64>,
    pub amount_usd: Option<f64>,
    pub dex_fees: Option<FeeSchedule>,
    pub current_prices: Option<HashMap<String, f64>>,
    pub apt_price: Option<f64>,
}

/// Ladder-scan optimization request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptimizeRequest {
    pub from_token: Option<TokenSymbol>,
    pub to_token: Option<TokenSymbol>,
    pub max_investment_apt: Option<f64>,
    pub dex_fees: Option<FeeSchedule>,
    pub current_prices: Option<HashMap<String, f64>>,
    pub apt_price: Option<f64>,
}

/// Single-amount analysis request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeRequest {
    pub apt_amount: Option<f64>,
    pub from_token: Option<TokenSymbol>,
    pub to_token: Option<TokenSymbol>,
    pub dex_fees: Option<FeeSchedule>,
    pub current_prices: Option<HashMap<String, f64>>,
    pub apt_price: Option<f64>,
}

/// Break-even search request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BreakevenRequest {
    pub from_token: Option<TokenSymbol>,
    pub to_token: Option<TokenSymbol>,
    pub dex_fees: Option<FeeSchedule>,
    pub current_prices: Option<HashMap<String, f64>>,
    pub apt_price: Option<f64>,
}

/// All supported actions, tagged by the `action` field
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action")]
pub enum ActionRequest {
    #[serde(rename = "getcharges")]
    GetCharges(RouteRequest),
    #[serde(rename = "isprofitable")]
    IsProfitable(RouteRequest),
    #[serde(rename = "possibilities")]
    Possibilities(ScanRequest),
    #[serde(rename = "optimize_investment")]
    OptimizeInvestment(OptimizeRequest),
    #[serde(rename = "analyze_amount")]
    AnalyzeAmount(AnalyzeRequest),
    #[serde(rename = "find_breakeven")]
    FindBreakeven(BreakevenRequest),
}

/// Parse a raw JSON request. An unrecognized action tag is rejected by name;
/// malformed fields under a known action surface as serialization errors.
pub fn parse_request(raw: Value) -> Result<ActionRequest, AppError> {
    let action = raw
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if !KNOWN_ACTIONS.contains(&action.as_str()) {
        return Err(ArbitrageError::UnknownAction(action).into());
    }
    Ok(serde_json::from_value(raw)?)
}

/// Resolve the USD trade size. Precedence: explicit trade amount, then an
/// APT amount converted at the effective APT price, then a USD amount, then
/// the configured default.
pub fn resolve_trade_amount(
    trade_amount: Option<f64>,
    amount_apt: Option<f64>,
    amount_usd: Option<f64>,
    apt_price: f64,
    default_trade_amount: f64,
) -> f64 {
    if let Some(amount) = trade_amount {
        amount
    } else if let Some(apt) = amount_apt {
        apt * apt_price
    } else if let Some(usd) = amount_usd {
        usd
    } else {
        default_trade_amount
    }
}

/// Apply per-request price overrides on top of the snapshot prices
pub fn effective_prices(
    snapshot_prices: PriceSet,
    overrides: Option<&HashMap<String, f64>>,
    apt_price: Option<f64>,
) -> PriceSet {
    let mut prices = snapshot_prices;
    if let Some(overrides) = overrides {
        prices.apply_overrides(overrides);
    }
    if let Some(apt) = apt_price {
        prices.set(TokenSymbol::Apt, apt);
    }
    prices
}

/// Fill in route defaults: the canonical stable-to-stable direction, and
/// venue names taken from the fee schedule or generic placeholders.
pub fn resolve_route(request: &RouteRequest, fees: &FeeSchedule, trade_amount: f64) -> Route {
    let available = fees.available_dexes();
    let from_dex = request
        .from_dex
        .clone()
        .or_else(|| available.first().cloned())
        .unwrap_or_else(|| "dex_a".to_string());
    let to_dex = request
        .to_dex
        .clone()
        .or_else(|| available.get(1).cloned())
        .unwrap_or_else(|| "dex_b".to_string());

    Route {
        from_pair: request.from_pair.unwrap_or(TradingPair::USDC_APT),
        to_pair: request.to_pair.unwrap_or(TradingPair::USDT_APT),
        from_dex,
        to_dex,
        trade_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_action_is_rejected_by_name() {
        let result = parse_request(json!({"action": "teleport", "trade_amount": 100.0}));
        match result {
            Err(AppError::Arbitrage(ArbitrageError::UnknownAction(name))) => {
                assert_eq!(name, "teleport");
            }
            other => panic!("expected UnknownAction, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_missing_action_is_rejected() {
        let result = parse_request(json!({"trade_amount": 100.0}));
        assert!(matches!(
            result,
            Err(AppError::Arbitrage(ArbitrageError::UnknownAction(_)))
        ));
    }

    #[test]
    fn test_parse_getcharges_request() {
        let request = parse_request(json!({
            "action": "getcharges",
            "from_pair": "usdc_apt",
            "to_pair": "usdt_apt",
            "trade_amount": 1500.0,
            "dex_fees": {"dexX": 0.25, "dexY": 0.30}
        }))
        .unwrap();

        match request {
            ActionRequest::GetCharges(req) => {
                assert_eq!(req.from_pair.unwrap(), TradingPair::USDC_APT);
                assert_eq!(req.trade_amount, Some(1500.0));
                assert_eq!(req.dex_fees.unwrap().resolve_fee("dexY"), 0.30);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_parse_optimize_request() {
        let request = parse_request(json!({
            "action": "optimize_investment",
            "from_token": "usdc",
            "to_token": "usdt",
            "max_investment_apt": 100.0
        }))
        .unwrap();
        assert!(matches!(
            request,
            ActionRequest::OptimizeInvestment(OptimizeRequest {
                max_investment_apt: Some(max),
                ..
            }) if max == 100.0
        ));
    }

    #[test]
    fn test_trade_amount_precedence() {
        assert_eq!(
            resolve_trade_amount(Some(500.0), Some(10.0), Some(900.0), 12.45, 1000.0),
            500.0
        );
        assert_eq!(
            resolve_trade_amount(None, Some(10.0), Some(900.0), 12.45, 1000.0),
            124.5
        );
        assert_eq!(
            resolve_trade_amount(None, None, Some(900.0), 12.45, 1000.0),
            900.0
        );
        assert_eq!(resolve_trade_amount(None, None, None, 12.45, 1000.0), 1000.0);
    }

    #[test]
    fn test_effective_prices_override_order() {
        let mut overrides = HashMap::new();
        overrides.insert("apt".to_string(), 10.0);
        overrides.insert("usdt".to_string(), 0.995);

        let prices = effective_prices(PriceSet::default(), Some(&overrides), Some(11.0));
        // The direct APT override wins over the map entry
        assert_eq!(prices.apt, 11.0);
        assert_eq!(prices.usdt, 0.995);
        assert_eq!(prices.usdc, 1.00);
    }

    #[test]
    fn test_route_defaults_from_fee_schedule() {
        let fees: FeeSchedule = [("dexX", 0.25), ("dexY", 0.30)].into_iter().collect();
        let route = resolve_route(&RouteRequest::default(), &fees, 1000.0);
        assert_eq!(route.from_pair, TradingPair::USDC_APT);
        assert_eq!(route.to_pair, TradingPair::USDT_APT);
        assert_eq!(route.from_dex, "dexX");
        assert_eq!(route.to_dex, "dexY");
    }

    #[test]
    fn test_route_defaults_to_placeholders() {
        let route = resolve_route(&RouteRequest::default(), &FeeSchedule::new(), 1000.0);
        assert_eq!(route.from_dex, "dex_a");
        assert_eq!(route.to_dex, "dex_b");
    }
}
