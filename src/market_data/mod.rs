// src/market_data/mod.rs
pub mod window;

pub use window::{PriceSnapshot, PriceWindow};
