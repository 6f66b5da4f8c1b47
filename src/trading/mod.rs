// src/trading/mod.rs
pub mod history;
pub mod plan;
pub mod signals;

pub use history::{LogEntry, RecommendationLog};
pub use plan::{atr_targets, plan, position_size, risk_reward_ratio, PositionSize};
pub use signals::SignalCombiner;
