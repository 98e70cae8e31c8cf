//! Application layer - use cases and services

pub mod commands;
pub mod request;
pub mod services;

pub use commands::{Cli, CommandExecutor, Commands};
pub use request::{parse_request, ActionRequest};
pub use services::ArbitrageService;
