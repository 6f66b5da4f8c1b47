// src/lib.rs
// Main library module declarations

pub mod analysis;
pub mod config;
pub mod domain;
pub mod engine;
pub mod feed;
pub mod market_data;
pub mod trading;

pub use engine::{Analysis, SignalEngine};
