//! Application services and use cases

use std::time::Duration;

use serde_json::{json, Value};
use tracing::info;

use crate::application::request::{
    effective_prices, resolve_route, resolve_trade_amount, ActionRequest, AnalyzeRequest,
    BreakevenRequest, OptimizeRequest, RouteRequest, ScanRequest,
};
use crate::domain::arbitrage::charge_calculator::{calculate_charges, SlippagePolicy};
use crate::domain::arbitrage::opportunity_detector::find_possibilities;
use crate::domain::arbitrage::profit_calculator::evaluate_route;
use crate::domain::dex::FeeSchedule;
use crate::domain::optimizer::investment_optimizer::{
    analyze_amount, find_breakeven, optimize_investment,
};
use crate::infrastructure::market_data::{MarketDataService, MarketSnapshot, ResultCache};
use crate::shared::errors::{AppError, ArbitrageError};
use crate::shared::types::{BotConfig, PriceSet, TokenSymbol};
use crate::shared::utils;

/// Application service for arbitrage analysis
pub struct ArbitrageService {
    config: BotConfig,
    market: MarketDataService,
    detector_cache: ResultCache<Value>,
    optimizer_cache: ResultCache<Value>,
}

impl ArbitrageService {
    /// Create a new arbitrage service
    pub fn new(config: BotConfig) -> Self {
        let market = MarketDataService::new(&config);
        Self::with_market(config, market)
    }

    pub fn with_market(config: BotConfig, market: MarketDataService) -> Self {
        let ttl = Duration::from_secs(config.arbitrage.result_cache_ttl_secs);
        Self {
            config,
            market,
            detector_cache: ResultCache::new(ttl),
            optimizer_cache: ResultCache::new(ttl),
        }
    }

    /// Live market overview for the supported tokens
    pub async fn market_overview(&self) -> Result<Value, AppError> {
        let snapshot = self.market.fetch_snapshot().await;
        Ok(serde_json::to_value(MarketDataService::market_overview(
            &snapshot,
        ))?)
    }

    /// Execute a request against a fresh market snapshot
    pub async fn execute(&self, request: ActionRequest) -> Result<Value, AppError> {
        let snapshot = self.market.fetch_snapshot().await;
        self.execute_with_snapshot(request, &snapshot).await
    }

    /// Execute a request against an already-resolved snapshot
    pub async fn execute_with_snapshot(
        &self,
        request: ActionRequest,
        snapshot: &MarketSnapshot,
    ) -> Result<Value, AppError> {
        match request {
            ActionRequest::GetCharges(req) => self.get_charges(&req, snapshot).await,
            ActionRequest::IsProfitable(req) => self.is_profitable(&req, snapshot).await,
            ActionRequest::Possibilities(req) => self.possibilities(&req, snapshot).await,
            ActionRequest::OptimizeInvestment(req) => self.optimize(&req, snapshot).await,
            ActionRequest::AnalyzeAmount(req) => self.analyze(&req, snapshot).await,
            ActionRequest::FindBreakeven(req) => self.breakeven(&req, snapshot).await,
        }
    }

    /// Structured error payload, echoing the route for impossible scenarios
    pub fn error_payload(error: &ArbitrageError) -> Value {
        match error {
            ArbitrageError::ImpossibleRoute {
                from_pair,
                to_pair,
                from_dex,
                to_dex,
            } => json!({
                "status": "error",
                "error": error.to_string(),
                "route": {
                    "from_pair": from_pair,
                    "to_pair": to_pair,
                    "from_dex": from_dex,
                    "to_dex": to_dex,
                },
                "reason": "Round-trip arbitrage on same trading pair with identical DEX fees is mathematically impossible",
            }),
            _ => json!({
                "status": "error",
                "error": error.to_string(),
            }),
        }
    }

    /// Last detector payload still within its TTL
    pub async fn last_detector_result(&self) -> Option<Value> {
        self.detector_cache.get().await
    }

    /// Last optimizer payload still within its TTL
    pub async fn last_optimizer_result(&self) -> Option<Value> {
        self.optimizer_cache.get().await
    }

    fn route_inputs(
        &self,
        dex_fees: &Option<FeeSchedule>,
        current_prices: Option<&std::collections::HashMap<String, f64>>,
        apt_price: Option<f64>,
        snapshot: &MarketSnapshot,
    ) -> (FeeSchedule, PriceSet) {
        let fees = dex_fees.clone().unwrap_or_default();
        let prices = effective_prices(snapshot.prices, current_prices, apt_price);
        (fees, prices)
    }

    async fn get_charges(
        &self,
        request: &RouteRequest,
        snapshot: &MarketSnapshot,
    ) -> Result<Value, AppError> {
        let (fees, prices) = self.route_inputs(
            &request.dex_fees,
            request.current_prices.as_ref(),
            request.apt_price,
            snapshot,
        );
        let trade_amount = resolve_trade_amount(
            request.trade_amount,
            request.amount_apt,
            request.amount_usd,
            prices.get(TokenSymbol::Apt),
            self.config.arbitrage.default_trade_amount,
        );
        let route = resolve_route(request, &fees, trade_amount);

        let charges = calculate_charges(
            trade_amount,
            &route.from_dex,
            &route.to_dex,
            &fees,
            &prices,
            snapshot.gas.gas_unit_price,
            snapshot.data_sources.gas_source.as_str(),
            SlippagePolicy::Standard,
        )?;

        let payload = json!({
            "status": "success",
            "timestamp": utils::utc_timestamp(),
            "route": route,
            "charges": charges,
            "investment_details": {
                "amount_apt": request.amount_apt,
                "amount_usd": trade_amount,
                "apt_price_used": prices.get(TokenSymbol::Apt),
                "dex_fees_applied": !fees.is_empty(),
            },
        });
        self.detector_cache.store(payload.clone()).await;
        Ok(payload)
    }

    async fn is_profitable(
        &self,
        request: &RouteRequest,
        snapshot: &MarketSnapshot,
    ) -> Result<Value, AppError> {
        let (fees, prices) = self.route_inputs(
            &request.dex_fees,
            request.current_prices.as_ref(),
            request.apt_price,
            snapshot,
        );
        let trade_amount = resolve_trade_amount(
            request.trade_amount,
            request.amount_apt,
            request.amount_usd,
            prices.get(TokenSymbol::Apt),
            self.config.arbitrage.default_trade_amount,
        );
        let route = resolve_route(request, &fees, trade_amount);

        let evaluated = evaluate_route(
            &route,
            &fees,
            &prices,
            snapshot.gas.gas_unit_price,
            snapshot.data_sources.gas_source.as_str(),
        )?;
        info!(
            "Route {} -> {} margin: {:.4}% ({})",
            route.from_pair,
            route.to_pair,
            evaluated.profitability.profit_margin_percent,
            evaluated.recommendation.as_str()
        );

        let payload = json!({
            "status": "success",
            "timestamp": utils::utc_timestamp(),
            "route": evaluated.route,
            "profitability": evaluated.profitability,
            "charges": evaluated.charges,
            "recommendation": evaluated.recommendation,
            "risk_level": evaluated.risk_level,
            "investment_details": {
                "amount_apt": request.amount_apt,
                "amount_usd": trade_amount,
                "apt_price_used": prices.get(TokenSymbol::Apt),
            },
        });
        self.detector_cache.store(payload.clone()).await;
        Ok(payload)
    }

    async fn possibilities(
        &self,
        request: &ScanRequest,
        snapshot: &MarketSnapshot,
    ) -> Result<Value, AppError> {
        let fees = request.dex_fees.clone().unwrap_or_default();
        let prices = effective_prices(
            snapshot.prices,
            request.current_prices.as_ref(),
            request.apt_price,
        );
        let trade_amount = resolve_trade_amount(
            request.trade_amount,
            request.amount_apt,
            request.amount_usd,
            prices.get(TokenSymbol::Apt),
            self.config.arbitrage.default_trade_amount,
        );

        let scan = find_possibilities(
            trade_amount,
            &fees,
            &prices,
            snapshot.gas.gas_unit_price,
            snapshot.data_sources.gas_source.as_str(),
        )?;
        info!(
            "Opportunity scan: {} profitable across {} combinations",
            scan.opportunities.profitable_count, scan.search_parameters.pairs_checked
        );

        let mut payload = serde_json::to_value(scan)?;
        payload["status"] = json!("success");
        payload["timestamp"] = json!(utils::utc_timestamp());
        payload["investment_details"] = json!({
            "amount_apt": request.amount_apt,
            "amount_usd": trade_amount,
            "apt_price_used": prices.get(TokenSymbol::Apt),
            "dex_fees_applied": !fees.is_empty(),
        });
        self.detector_cache.store(payload.clone()).await;
        Ok(payload)
    }

    async fn optimize(
        &self,
        request: &OptimizeRequest,
        snapshot: &MarketSnapshot,
    ) -> Result<Value, AppError> {
        let fees = request.dex_fees.clone().unwrap_or_default();
        let prices = effective_prices(
            snapshot.prices,
            request.current_prices.as_ref(),
            request.apt_price,
        );
        let from_token = request.from_token.unwrap_or(TokenSymbol::Usdc);
        let to_token = request.to_token.unwrap_or(TokenSymbol::Usdt);
        let max_investment = request
            .max_investment_apt
            .unwrap_or(self.config.arbitrage.max_investment_apt);

        let outcome = optimize_investment(from_token, to_token, &fees, &prices, max_investment)?;

        let mut payload = serde_json::to_value(outcome)?;
        payload["status"] = json!("success");
        payload["timestamp"] = json!(utils::utc_timestamp());
        self.optimizer_cache.store(payload.clone()).await;
        Ok(payload)
    }

    async fn analyze(
        &self,
        request: &AnalyzeRequest,
        snapshot: &MarketSnapshot,
    ) -> Result<Value, AppError> {
        let fees = request.dex_fees.clone().unwrap_or_default();
        let prices = effective_prices(
            snapshot.prices,
            request.current_prices.as_ref(),
            request.apt_price,
        );
        let from_token = request.from_token.unwrap_or(TokenSymbol::Usdc);
        let to_token = request.to_token.unwrap_or(TokenSymbol::Usdt);
        let apt_amount = request.apt_amount.unwrap_or(1000.0);

        let analysis = analyze_amount(apt_amount, from_token, to_token, &fees, &prices)?;

        let payload = json!({
            "status": "success",
            "timestamp": utils::utc_timestamp(),
            "analysis": {
                "apt_investment": analysis.apt_investment,
                "usd_investment": analysis.usd_investment,
                "is_profitable": analysis.profit.is_profitable,
                "net_profit_usd": analysis.profit.net_profit_usd,
                "profit_margin_percent": analysis.profit.profit_margin_percent,
                "roi_percent": analysis.profit.roi_percent,
                "risk_level": analysis.profit.risk_level,
                "total_costs_usd": analysis.profit.total_costs_usd,
            },
            "cost_breakdown": analysis.profit.breakdown,
            "recommendation": analysis.recommendation,
        });
        self.optimizer_cache.store(payload.clone()).await;
        Ok(payload)
    }

    async fn breakeven(
        &self,
        request: &BreakevenRequest,
        snapshot: &MarketSnapshot,
    ) -> Result<Value, AppError> {
        let fees = request.dex_fees.clone().unwrap_or_default();
        let prices = effective_prices(
            snapshot.prices,
            request.current_prices.as_ref(),
            request.apt_price,
        );
        let from_token = request.from_token.unwrap_or(TokenSymbol::Usdc);
        let to_token = request.to_token.unwrap_or(TokenSymbol::Usdt);

        let outcome = find_breakeven(from_token, to_token, &fees, &prices)?;

        let payload = json!({
            "status": "success",
            "timestamp": utils::utc_timestamp(),
            "breakeven_analysis": {
                "breakeven_apt_amount": outcome.breakeven_apt_amount,
                "breakeven_usd_amount": outcome.breakeven_usd_amount,
                "found": outcome.found,
            },
            "market_conditions": {
                "price_spread_percent": outcome.price_spread_percent,
                "minimum_spread_needed": outcome.minimum_spread_needed,
            },
        });
        self.optimizer_cache.store(payload.clone()).await;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::request::parse_request;
    use serde_json::json;

    fn service() -> ArbitrageService {
        ArbitrageService::new(BotConfig::default())
    }

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot::fallback()
    }

    #[tokio::test]
    async fn test_get_charges_payload_shape() {
        let request = parse_request(json!({
            "action": "getcharges",
            "trade_amount": 1000.0,
            "dex_fees": {"dexX": 0.25, "dexY": 0.30},
        }))
        .unwrap();

        let payload = service()
            .execute_with_snapshot(request, &snapshot())
            .await
            .unwrap();
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["route"]["from_dex"], "dexX");
        assert_eq!(payload["charges"]["gas_fees"]["gas_unit_price_octas"], 100);
        assert_eq!(payload["charges"]["gas_fees"]["gas_source"], "fallback");
        assert_eq!(payload["investment_details"]["dex_fees_applied"], true);
    }

    #[tokio::test]
    async fn test_is_profitable_round_trip_error() {
        let request = parse_request(json!({
            "action": "isprofitable",
            "from_pair": "usdc_apt",
            "to_pair": "apt_usdc",
            "from_dex": "dex_a",
            "to_dex": "dex_a",
            "trade_amount": 1000.0,
        }))
        .unwrap();

        let result = service().execute_with_snapshot(request, &snapshot()).await;
        match result {
            Err(AppError::Arbitrage(err @ ArbitrageError::ImpossibleRoute { .. })) => {
                let payload = ArbitrageService::error_payload(&err);
                assert_eq!(payload["status"], "error");
                assert_eq!(payload["route"]["from_dex"], "dex_a");
                assert!(payload["reason"]
                    .as_str()
                    .unwrap()
                    .contains("mathematically impossible"));
            }
            other => panic!("expected ImpossibleRoute, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_possibilities_payload_and_cache() {
        let svc = service();
        let request = parse_request(json!({
            "action": "possibilities",
            "trade_amount": 5000.0,
            "dex_fees": {"dexX": 0.25, "dexY": 0.30},
        }))
        .unwrap();

        let payload = svc
            .execute_with_snapshot(request, &snapshot())
            .await
            .unwrap();
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["search_parameters"]["pairs_checked"], 8);
        assert!(payload["opportunities"]["top_opportunities"]
            .as_array()
            .unwrap()
            .len()
            <= 8);

        let cached = svc.last_detector_result().await.unwrap();
        assert_eq!(cached["search_parameters"]["pairs_checked"], 8);
    }

    #[tokio::test]
    async fn test_optimize_uses_price_override() {
        let request = parse_request(json!({
            "action": "optimize_investment",
            "from_token": "usdc",
            "to_token": "usdt",
            "max_investment_apt": 100.0,
            "apt_price": 10.0,
        }))
        .unwrap();

        let payload = service()
            .execute_with_snapshot(request, &snapshot())
            .await
            .unwrap();
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["market_conditions"]["apt_price_usd"], 10.0);
        assert_eq!(payload["optimization"]["amounts_tested"], 6);
    }

    #[tokio::test]
    async fn test_analyze_and_breakeven_payloads() {
        let svc = service();
        let analyze = parse_request(json!({
            "action": "analyze_amount",
            "apt_amount": 100.0,
        }))
        .unwrap();
        let payload = svc
            .execute_with_snapshot(analyze, &snapshot())
            .await
            .unwrap();
        assert_eq!(payload["analysis"]["apt_investment"], 100.0);
        assert!(payload["cost_breakdown"]["price_difference_percent"].is_number());

        let breakeven = parse_request(json!({"action": "find_breakeven"})).unwrap();
        let payload = svc
            .execute_with_snapshot(breakeven, &snapshot())
            .await
            .unwrap();
        assert!(payload["breakeven_analysis"]["found"].is_boolean());
        assert_eq!(payload["market_conditions"]["minimum_spread_needed"], 0.6);

        assert!(svc.last_optimizer_result().await.is_some());
    }
}
