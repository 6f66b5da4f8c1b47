// src/domain/mod.rs
pub mod errors;
pub mod models;

// Re-export common types for convenience
pub use errors::{
    AnalysisError, AnalysisResult, AppError, AppResult, ConfigError, ConfigResult, FeedError,
    FeedResult, MarketDataError, MarketDataResult,
};
pub use models::{
    HoldTime, PriceSample, Recommendation, RecommendationLabel, RiskLevel, Signal, SignalBias,
    TradingPlan,
};
