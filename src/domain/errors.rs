// src/domain/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Rejections raised at the price window boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("Invalid price {price}: must be finite and within [{min}, {max}]")]
    InvalidPrice { price: f64, min: f64, max: f64 },

    #[error("Out-of-order sample: {timestamp} is older than newest sample {newest}")]
    OutOfOrder { timestamp: String, newest: String },

    #[error("Invalid sample: {0}")]
    InvalidSample(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data for {indicator}: need {required} samples, got {available}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Degenerate input: {0}")]
    DegenerateMath(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("Price source unavailable: {0}")]
    Unavailable(String),

    #[error("Feed runner already running")]
    AlreadyRunning,

    #[error("Feed closed")]
    Closed,
}

// Result type aliases for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type MarketDataResult<T> = Result<T, MarketDataError>;
pub type AnalysisResult<T> = Result<T, AnalysisError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type FeedResult<T> = Result<T, FeedError>;
