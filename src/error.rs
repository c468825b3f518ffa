use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Price API returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid price data: {0}")]
    InvalidPriceData(String),

    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Missing rates: {0}")]
    MissingRates(String),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupted value for {key}: {value:?}")]
    CorruptedValue { key: String, value: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TrackerError::Network(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            TrackerError::Network(format!("Connection error: {}", err))
        } else if err.is_decode() {
            TrackerError::InvalidPriceData(format!("Undecodable body: {}", err))
        } else {
            TrackerError::Network(format!("HTTP error: {}", err))
        }
    }
}

impl From<sqlx::Error> for TrackerError {
    fn from(err: sqlx::Error) -> Self {
        TrackerError::Storage(format!("SQLite error: {}", err))
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::InvalidPriceData(format!("JSON parsing error: {}", err))
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Error handling utilities
pub struct ErrorHandler;

impl ErrorHandler {
    /// Log error and return the short message a front end can display
    pub fn user_message(error: &TrackerError) -> String {
        match error {
            TrackerError::Network(msg) => {
                tracing::error!("Network error: {}", msg);
                "Price service unreachable".to_string()
            }
            TrackerError::Http { status, .. } => {
                tracing::error!("Price API status {}", status);
                format!("Price service error ({})", status)
            }
            TrackerError::InvalidPriceData(msg) => {
                tracing::error!("Invalid price data: {}", msg);
                "Price service sent invalid data".to_string()
            }
            TrackerError::InvalidSymbol(symbol) => {
                tracing::warn!("Invalid symbol: {:?}", symbol);
                format!("Unknown coin {:?}", symbol)
            }
            TrackerError::InvalidQuantity(msg) => {
                tracing::warn!("Invalid quantity: {}", msg);
                "Amount must be a positive number".to_string()
            }
            TrackerError::MissingRates(msg) => {
                tracing::warn!("Missing rates: {}", msg);
                "Failed to compute total value".to_string()
            }
            TrackerError::UnsupportedCurrency(currency) => {
                tracing::warn!("Unsupported currency requested: {}", currency);
                format!("Currency {} is not supported", currency)
            }
            TrackerError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                "Local storage unavailable".to_string()
            }
            TrackerError::CorruptedValue { key, value } => {
                tracing::error!("Corrupted stored value for {}: {:?}", key, value);
                format!("Stored amount for {} is corrupted", key)
            }
            TrackerError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                format!("Configuration error: {}", msg)
            }
        }
    }

    /// Failures that clear up on their own once the price service recovers
    pub fn is_transient(error: &TrackerError) -> bool {
        match error {
            TrackerError::Network(_) => true,
            TrackerError::Http { status, .. } => *status == 429 || *status >= 500,
            TrackerError::MissingRates(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ErrorHandler::is_transient(&TrackerError::Network("down".into())));
        assert!(ErrorHandler::is_transient(&TrackerError::Http { status: 503, body: String::new() }));
        assert!(ErrorHandler::is_transient(&TrackerError::Http { status: 429, body: String::new() }));
        assert!(!ErrorHandler::is_transient(&TrackerError::Http { status: 404, body: String::new() }));
        assert!(!ErrorHandler::is_transient(&TrackerError::CorruptedValue {
            key: "BTC".into(),
            value: "abc".into(),
        }));
    }

    #[test]
    fn test_user_message_for_missing_rates() {
        let msg = ErrorHandler::user_message(&TrackerError::MissingRates("BTC".into()));
        assert_eq!(msg, "Failed to compute total value");
    }
}
