// src/feed/synthetic.rs
use super::PriceFeed;
use crate::config::FeedConfig;
use crate::domain::errors::FeedResult;
use crate::domain::models::PriceSample;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// SIMULATED prices: a seeded random walk for demos and tests.
///
/// Nothing produced here reflects a real market.
pub struct SyntheticFeed {
    rng: StdRng,
    price: f64,
    max_step_pct: f64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl SyntheticFeed {
    pub fn new(start_price: f64, max_step_pct: f64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            price: start_price,
            max_step_pct: max_step_pct.abs(),
            last_timestamp: None,
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(
            config.synthetic_start_price,
            config.synthetic_max_step_pct,
            config.synthetic_seed,
        )
    }

    /// Advance the walk one step and return the new (price, high, low).
    fn step(&mut self) -> (f64, f64, f64) {
        let previous = self.price;
        let change_pct = if self.max_step_pct > 0.0 {
            self.rng.gen_range(-self.max_step_pct..=self.max_step_pct)
        } else {
            0.0
        };
        self.price = previous * (1.0 + change_pct / 100.0);

        (self.price, previous.max(self.price), previous.min(self.price))
    }
}

#[async_trait]
impl PriceFeed for SyntheticFeed {
    async fn next_quote(&mut self) -> FeedResult<PriceSample> {
        let (price, high, low) = self.step();
        let volume = self.rng.gen_range(0.5..5.0);

        // keep timestamps non-decreasing even if the wall clock steps back
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);

        Ok(PriceSample::new(timestamp, price)
            .with_range(high, low)
            .with_volume(volume))
    }

    fn name(&self) -> &str {
        "synthetic (simulated)"
    }
}
