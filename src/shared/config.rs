//! Configuration loading

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::shared::errors::AppError;
use crate::shared::types::BotConfig;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a specific file path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<BotConfig, AppError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: BotConfig = toml::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Load `Config.toml` from the working directory, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load_or_default() -> BotConfig {
        match Self::load_from("Config.toml") {
            Ok(config) => config,
            Err(e) => {
                warn!("Using default configuration: {}", e);
                BotConfig::default()
            }
        }
    }
}
