// src/analysis/mod.rs
pub mod indicator_set;
pub mod indicators;
pub mod outlook;

pub use indicator_set::{compute_all, IndicatorSet};
pub use indicators::{BollingerBands, KeyLevels};
pub use outlook::MarketOutlook;
