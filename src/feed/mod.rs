// src/feed/mod.rs
pub mod runner;
pub mod synthetic;

use crate::domain::errors::FeedResult;
use crate::domain::models::PriceSample;
use async_trait::async_trait;

pub use runner::FeedRunner;
pub use synthetic::SyntheticFeed;

/// Source of spot price observations
#[async_trait]
pub trait PriceFeed: Send {
    /// Fetch the next observation. `FeedError::Closed` ends the stream.
    async fn next_quote(&mut self) -> FeedResult<PriceSample>;

    fn name(&self) -> &str;
}
