//! CLI commands and handlers

use std::collections::HashMap;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::application::request::{
    parse_request, ActionRequest, AnalyzeRequest, BreakevenRequest, OptimizeRequest, RouteRequest,
    ScanRequest,
};
use crate::application::services::ArbitrageService;
use crate::domain::dex::FeeSchedule;
use crate::shared::errors::AppError;
use crate::shared::types::{BotConfig, TokenSymbol, TradingPair};

#[derive(Parser)]
#[command(name = "aptarb")]
#[command(about = "Aptos token arbitrage analyzer for APT, USDC and USDT")]
pub struct Cli {
    /// Path to a configuration file (defaults to Config.toml if present)
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Market data shared by every analysis command
#[derive(Args, Debug, Clone, Default)]
pub struct MarketArgs {
    /// DEX fee in percent, as name=fee (repeatable)
    #[arg(long = "fee", value_name = "DEX=PERCENT")]
    pub fees: Vec<String>,

    /// Token price override in USD, as token=price (repeatable)
    #[arg(long = "price", value_name = "TOKEN=USD")]
    pub prices: Vec<String>,

    /// Direct APT price override in USD
    #[arg(long)]
    pub apt_price: Option<f64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show live market overview for APT, USDC, USDT
    Market,

    /// Calculate all charges for an arbitrage route
    Charges {
        /// Entry trading pair, e.g. usdc_apt
        #[arg(long)]
        from_pair: Option<String>,

        /// Exit trading pair, e.g. usdt_apt
        #[arg(long)]
        to_pair: Option<String>,

        /// Entry DEX identifier
        #[arg(long)]
        from_dex: Option<String>,

        /// Exit DEX identifier
        #[arg(long)]
        to_dex: Option<String>,

        /// Trade amount in USD
        #[arg(long)]
        amount: Option<f64>,

        /// Trade amount in APT
        #[arg(long)]
        amount_apt: Option<f64>,

        #[command(flatten)]
        market: MarketArgs,
    },

    /// Check whether a specific route is profitable
    Profitable {
        /// Entry trading pair, e.g. usdc_apt
        #[arg(long)]
        from_pair: Option<String>,

        /// Exit trading pair, e.g. usdt_apt
        #[arg(long)]
        to_pair: Option<String>,

        /// Entry DEX identifier
        #[arg(long)]
        from_dex: Option<String>,

        /// Exit DEX identifier
        #[arg(long)]
        to_dex: Option<String>,

        /// Trade amount in USD
        #[arg(long)]
        amount: Option<f64>,

        /// Trade amount in APT
        #[arg(long)]
        amount_apt: Option<f64>,

        #[command(flatten)]
        market: MarketArgs,
    },

    /// Enumerate all profitable pair and DEX combinations
    Possibilities {
        /// Trade amount in USD
        #[arg(long)]
        amount: Option<f64>,

        /// Trade amount in APT
        #[arg(long)]
        amount_apt: Option<f64>,

        #[command(flatten)]
        market: MarketArgs,
    },

    /// Find the optimal APT investment size
    Optimize {
        /// Source token (apt, usdc, usdt)
        #[arg(long, default_value = "usdc")]
        from_token: String,

        /// Destination token (apt, usdc, usdt)
        #[arg(long, default_value = "usdt")]
        to_token: String,

        /// Largest APT investment to consider
        #[arg(long)]
        max_investment_apt: Option<f64>,

        #[command(flatten)]
        market: MarketArgs,
    },

    /// Analyze one specific APT investment amount
    Analyze {
        /// Investment amount in APT
        #[arg(long)]
        amount_apt: f64,

        /// Source token (apt, usdc, usdt)
        #[arg(long, default_value = "usdc")]
        from_token: String,

        /// Destination token (apt, usdc, usdt)
        #[arg(long, default_value = "usdt")]
        to_token: String,

        #[command(flatten)]
        market: MarketArgs,
    },

    /// Find the break-even investment size
    Breakeven {
        /// Source token (apt, usdc, usdt)
        #[arg(long, default_value = "usdc")]
        from_token: String,

        /// Destination token (apt, usdc, usdt)
        #[arg(long, default_value = "usdt")]
        to_token: String,

        #[command(flatten)]
        market: MarketArgs,
    },

    /// Process a raw JSON action request
    Request {
        /// Request payload, e.g. '{"action":"possibilities","trade_amount":1000}'
        json: String,
    },
}

/// Parse repeated key=value arguments
fn parse_key_value_args(args: &[String]) -> Result<Vec<(String, f64)>, AppError> {
    let mut pairs = Vec::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| AppError::ConfigError(format!("Expected key=value, got '{}'", arg)))?;
        let value: f64 = value
            .parse()
            .map_err(|_| AppError::ConfigError(format!("Invalid numeric value in '{}'", arg)))?;
        pairs.push((key.trim().to_string(), value));
    }
    Ok(pairs)
}

fn parse_fee_schedule(args: &[String]) -> Result<Option<FeeSchedule>, AppError> {
    if args.is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_key_value_args(args)?.into_iter().collect()))
}

fn parse_price_overrides(args: &[String]) -> Result<Option<HashMap<String, f64>>, AppError> {
    if args.is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_key_value_args(args)?.into_iter().collect()))
}

fn parse_pair(pair: &Option<String>) -> Result<Option<TradingPair>, AppError> {
    pair.as_deref()
        .map(|p| p.parse::<TradingPair>())
        .transpose()
        .map_err(AppError::from)
}

fn parse_token(token: &str) -> Result<TokenSymbol, AppError> {
    token.parse::<TokenSymbol>().map_err(AppError::from)
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: BotConfig) -> Result<(), AppError> {
        let service = ArbitrageService::new(config);

        let payload = match command {
            Commands::Market => service.market_overview().await?,
            Commands::Request { json } => {
                let raw: Value = serde_json::from_str(&json)?;
                match parse_request(raw) {
                    Ok(request) => Self::run_request(&service, request).await?,
                    Err(AppError::Arbitrage(err)) => ArbitrageService::error_payload(&err),
                    Err(other) => return Err(other),
                }
            }
            other => {
                let request = Self::build_request(other)?;
                Self::run_request(&service, request).await?
            }
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        Ok(())
    }

    /// Run a request, rendering analysis rejections as error payloads
    async fn run_request(
        service: &ArbitrageService,
        request: ActionRequest,
    ) -> Result<Value, AppError> {
        match service.execute(request).await {
            Ok(payload) => Ok(payload),
            Err(AppError::Arbitrage(err)) => Ok(ArbitrageService::error_payload(&err)),
            Err(other) => Err(other),
        }
    }

    fn build_request(command: Commands) -> Result<ActionRequest, AppError> {
        match command {
            Commands::Charges {
                from_pair,
                to_pair,
                from_dex,
                to_dex,
                amount,
                amount_apt,
                market,
            } => Ok(ActionRequest::GetCharges(RouteRequest {
                from_pair: parse_pair(&from_pair)?,
                to_pair: parse_pair(&to_pair)?,
                from_dex,
                to_dex,
                trade_amount: amount,
                amount_apt,
                amount_usd: None,
                dex_fees: parse_fee_schedule(&market.fees)?,
                current_prices: parse_price_overrides(&market.prices)?,
                apt_price: market.apt_price,
            })),
            Commands::Profitable {
                from_pair,
                to_pair,
                from_dex,
                to_dex,
                amount,
                amount_apt,
                market,
            } => Ok(ActionRequest::IsProfitable(RouteRequest {
                from_pair: parse_pair(&from_pair)?,
                to_pair: parse_pair(&to_pair)?,
                from_dex,
                to_dex,
                trade_amount: amount,
                amount_apt,
                amount_usd: None,
                dex_fees: parse_fee_schedule(&market.fees)?,
                current_prices: parse_price_overrides(&market.prices)?,
                apt_price: market.apt_price,
            })),
            Commands::Possibilities {
                amount,
                amount_apt,
                market,
            } => Ok(ActionRequest::Possibilities(ScanRequest {
                trade_amount: amount,
                amount_apt,
                amount_usd: None,
                dex_fees: parse_fee_schedule(&market.fees)?,
                current_prices: parse_price_overrides(&market.prices)?,
                apt_price: market.apt_price,
            })),
            Commands::Optimize {
                from_token,
                to_token,
                max_investment_apt,
                market,
            } => Ok(ActionRequest::OptimizeInvestment(OptimizeRequest {
                from_token: Some(parse_token(&from_token)?),
                to_token: Some(parse_token(&to_token)?),
                max_investment_apt,
                dex_fees: parse_fee_schedule(&market.fees)?,
                current_prices: parse_price_overrides(&market.prices)?,
                apt_price: market.apt_price,
            })),
            Commands::Analyze {
                amount_apt,
                from_token,
                to_token,
                market,
            } => Ok(ActionRequest::AnalyzeAmount(AnalyzeRequest {
                apt_amount: Some(amount_apt),
                from_token: Some(parse_token(&from_token)?),
                to_token: Some(parse_token(&to_token)?),
                dex_fees: parse_fee_schedule(&market.fees)?,
                current_prices: parse_price_overrides(&market.prices)?,
                apt_price: market.apt_price,
            })),
            Commands::Breakeven {
                from_token,
                to_token,
                market,
            } => Ok(ActionRequest::FindBreakeven(BreakevenRequest {
                from_token: Some(parse_token(&from_token)?),
                to_token: Some(parse_token(&to_token)?),
                dex_fees: parse_fee_schedule(&market.fees)?,
                current_prices: parse_price_overrides(&market.prices)?,
                apt_price: market.apt_price,
            })),
            Commands::Market | Commands::Request { .. } => Err(AppError::ConfigError(
                "Command handled before request building".to_string(),
            )),
        }
    }
}
