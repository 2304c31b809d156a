use alloy::primitives::{address, Address};
use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::AppError;

/// Wrapped ETH on Ethereum mainnet
pub const WETH_MAINNET: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

pub const DEFAULT_THRESHOLD_ETH: &str = "0.1";
pub const DEFAULT_ETH_PRICE_MAX_STALENESS_SECONDS: u64 = 2 * 60 * 60;
pub const DEFAULT_MAX_PLAUSIBLE_PRICE_ETH: &str = "10000000000";

const ENV_PREFIX: &str = "SWAP_ANALYZER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub analysis: AnalysisSettings,
    pub logging: LoggingSettings,
    #[serde(default)]
    pub input: InputSettings,
}

/// Decimal values are kept as strings so a TOML float never leaks binary
/// rounding into the threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub threshold_eth: String,
    pub weth_address: String,
    pub eth_price_max_staleness_seconds: u64,
    pub max_plausible_price_eth: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSettings {
    pub batch_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            analysis: AnalysisSettings::default(),
            logging: LoggingSettings::default(),
            input: InputSettings::default(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            threshold_eth: DEFAULT_THRESHOLD_ETH.to_string(),
            weth_address: WETH_MAINNET.to_string(),
            eth_price_max_staleness_seconds: DEFAULT_ETH_PRICE_MAX_STALENESS_SECONDS,
            max_plausible_price_eth: DEFAULT_MAX_PLAUSIBLE_PRICE_ETH.to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Defaults, then `config/default.toml` if present, then `SWAP_ANALYZER__*`
    /// environment variables (a `.env` file is loaded first).
    pub fn new() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::load(None)
    }

    pub fn load(config_file: Option<&Path>) -> Result<Self, AppError> {
        let defaults = Settings::default();

        let mut builder = config::Config::builder()
            .set_default("analysis.threshold_eth", defaults.analysis.threshold_eth)?
            .set_default("analysis.weth_address", defaults.analysis.weth_address)?
            .set_default(
                "analysis.eth_price_max_staleness_seconds",
                defaults.analysis.eth_price_max_staleness_seconds,
            )?
            .set_default("analysis.max_plausible_price_eth", defaults.analysis.max_plausible_price_eth)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.json", defaults.logging.json)?
            .add_source(config::File::with_name("config/default").required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.analysis_config().map(|_| ())
    }

    /// The explicit configuration value handed to the analysis components.
    pub fn analysis_config(&self) -> Result<AnalysisConfig, AppError> {
        let threshold_eth = parse_decimal("analysis.threshold_eth", &self.analysis.threshold_eth)?;
        if threshold_eth <= BigDecimal::zero() {
            return Err(AppError::ConfigError(format!(
                "analysis.threshold_eth must be positive, got {}",
                threshold_eth
            )));
        }

        let max_plausible_price_eth =
            parse_decimal("analysis.max_plausible_price_eth", &self.analysis.max_plausible_price_eth)?;
        if max_plausible_price_eth <= BigDecimal::zero() {
            return Err(AppError::ConfigError(
                "analysis.max_plausible_price_eth must be positive".to_string(),
            ));
        }

        let weth_address = Address::from_str(self.analysis.weth_address.trim()).map_err(|e| {
            AppError::ConfigError(format!(
                "analysis.weth_address '{}' is not an address: {}",
                self.analysis.weth_address, e
            ))
        })?;

        Ok(AnalysisConfig {
            threshold_eth,
            weth_address,
            eth_price_max_staleness_seconds: self.analysis.eth_price_max_staleness_seconds,
            max_plausible_price_eth,
        })
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(value.trim())
        .map_err(|e| AppError::ConfigError(format!("{} '{}' is not a decimal: {}", field, value, e)))
}

/// Configuration consumed by the analysis core. Passed in explicitly; the
/// core never reads the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub threshold_eth: BigDecimal,
    pub weth_address: Address,
    pub eth_price_max_staleness_seconds: u64,
    pub max_plausible_price_eth: BigDecimal,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            threshold_eth: BigDecimal::from_str(DEFAULT_THRESHOLD_ETH).unwrap_or_else(|_| BigDecimal::zero()),
            weth_address: WETH_MAINNET,
            eth_price_max_staleness_seconds: DEFAULT_ETH_PRICE_MAX_STALENESS_SECONDS,
            max_plausible_price_eth: BigDecimal::from(10_000_000_000u64),
        }
    }
}

impl AnalysisConfig {
    pub fn with_threshold(mut self, threshold_eth: BigDecimal) -> Self {
        self.threshold_eth = threshold_eth;
        self
    }
}
