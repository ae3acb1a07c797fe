// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use dotenv::dotenv;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Marketplace service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Market rules (fees, commission, lead badges)
    pub market: MarketConfig,

    /// Local price-estimation configuration
    pub estimator: EstimatorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Market rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Fraction of the asking price an agent pays to claim a lead
    pub claim_fee_rate: Decimal,

    /// Fraction of the final price credited to the agent as commission
    pub commission_rate: Decimal,

    /// Minimum asking price for the HOT badge
    pub hot_lead_min_price: i64,

    /// Maximum lead age for the HOT badge, in minutes
    pub hot_lead_max_age_minutes: i64,
}

/// Rate-card estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Base resale prices keyed by device model prefix
    pub rate_card: HashMap<String, i64>,

    /// Depreciation factor applied to the base price
    pub depreciation: Decimal,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let market = MarketConfig {
            claim_fee_rate: env::var("CLAIM_FEE_RATE")
                .unwrap_or_else(|_| "0.10".to_string())
                .parse()
                .unwrap_or(dec!(0.10)),
            commission_rate: env::var("COMMISSION_RATE")
                .unwrap_or_else(|_| "0.15".to_string())
                .parse()
                .unwrap_or(dec!(0.15)),
            hot_lead_min_price: env::var("HOT_LEAD_MIN_PRICE")
                .unwrap_or_else(|_| "50000".to_string())
                .parse()
                .unwrap_or(50_000),
            hot_lead_max_age_minutes: env::var("HOT_LEAD_MAX_AGE_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
        };

        // The rate card is a JSON object of model prefix -> base price
        let rate_card = match env::var("ESTIMATOR_RATE_CARD") {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::Config(format!("Failed to parse ESTIMATOR_RATE_CARD: {}", e))
            })?,
            Err(_) => HashMap::new(),
        };
        let estimator = EstimatorConfig {
            rate_card,
            depreciation: env::var("ESTIMATOR_DEPRECIATION")
                .unwrap_or_else(|_| "0.70".to_string())
                .parse()
                .unwrap_or(dec!(0.70)),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env::var("LOG_TO_FILE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        Ok(Config {
            market,
            estimator,
            logging,
        })
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let mut file = File::open(path)
            .map_err(|e| AppError::Config(format!("Failed to open config file: {}", e)))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| AppError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path)
                    .map_err(|e| AppError::Config(format!("Failed to create log file: {}", e)))?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        builder.init();

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            market: MarketConfig {
                claim_fee_rate: dec!(0.10),
                commission_rate: dec!(0.15),
                hot_lead_min_price: 50_000,
                hot_lead_max_age_minutes: 60,
            },
            estimator: EstimatorConfig {
                rate_card: HashMap::new(),
                depreciation: dec!(0.70),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}
