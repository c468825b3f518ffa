use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use crate::error::{TrackerError, TrackerResult};

pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceApiConfig {
    pub base_url: String,
    pub freshness_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub price_api: PriceApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            price_api: PriceApiConfig {
                base_url: DEFAULT_PRICE_API_URL.to_string(),
                freshness_secs: 300, // 5 minutes
                request_timeout_secs: 10,
            },
            storage: StorageConfig {
                path: "holdings.db".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl PriceApiConfig {
    /// Checked by `AppConfig::validate`; an out-of-range value saturates
    pub fn freshness_window(&self) -> chrono::Duration {
        self.try_freshness_window().unwrap_or(chrono::Duration::MAX)
    }

    fn try_freshness_window(&self) -> Option<chrono::Duration> {
        i64::try_from(self.freshness_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from environment variables, reading `.env` first
    pub fn from_env() -> TrackerResult<Self> {
        dotenv::dotenv().ok();
        let mut config = Self::default();

        if let Ok(url) = env::var("PRICE_API_URL") {
            config.price_api.base_url = url;
        }

        if let Ok(freshness) = env::var("RATE_FRESHNESS_SECS") {
            config.price_api.freshness_secs = freshness.parse()
                .map_err(|_| TrackerError::Configuration("Invalid RATE_FRESHNESS_SECS".to_string()))?;
        }

        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECS") {
            config.price_api.request_timeout_secs = timeout.parse()
                .map_err(|_| TrackerError::Configuration("Invalid REQUEST_TIMEOUT_SECS".to_string()))?;
        }

        if let Ok(db_path) = env::var("DATABASE_PATH") {
            config.storage.path = db_path;
        }

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.logging.level = log_level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> TrackerResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TrackerError::Configuration(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> TrackerResult<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| TrackerError::Configuration(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        url::Url::parse(&self.price_api.base_url)
            .map_err(|e| TrackerError::Configuration(format!("Invalid price API url: {}", e)))?;

        if self.price_api.freshness_secs == 0 {
            return Err(TrackerError::Configuration("Freshness window must be greater than 0".to_string()));
        }

        if self.price_api.try_freshness_window().is_none() {
            return Err(TrackerError::Configuration(format!(
                "Freshness window out of range: {}s",
                self.price_api.freshness_secs
            )));
        }

        if self.price_api.request_timeout_secs == 0 {
            return Err(TrackerError::Configuration("Request timeout must be greater than 0".to_string()));
        }

        if self.storage.path.is_empty() {
            return Err(TrackerError::Configuration("Database path cannot be empty".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(TrackerError::Configuration(format!("Invalid log level: {}", self.logging.level)));
        }

        Ok(())
    }
}
