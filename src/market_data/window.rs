// src/market_data/window.rs
use crate::config::WindowConfig;
use crate::domain::errors::{ConfigResult, MarketDataError, MarketDataResult};
use crate::domain::models::PriceSample;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Fixed-capacity, time-ordered buffer of validated price samples.
///
/// The oldest sample is evicted once `capacity` is reached. Samples that
/// cannot represent a plausible spot price, or that arrive out of order,
/// are rejected before they reach the buffer.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    samples: VecDeque<PriceSample>,
    capacity: usize,
    min_valid_price: f64,
    max_valid_price: f64,
}

impl PriceWindow {
    /// Fails on a zero capacity or on bounds that admit no finite price.
    pub fn new(
        capacity: usize,
        min_valid_price: f64,
        max_valid_price: f64,
    ) -> ConfigResult<Self> {
        Self::from_config(&WindowConfig {
            capacity,
            min_valid_price,
            max_valid_price,
            ..WindowConfig::default()
        })
    }

    pub fn from_config(config: &WindowConfig) -> ConfigResult<Self> {
        config.validate()?;

        Ok(Self {
            samples: VecDeque::with_capacity(config.capacity),
            capacity: config.capacity,
            min_valid_price: config.min_valid_price,
            max_valid_price: config.max_valid_price,
        })
    }

    /// Validate and append one sample, evicting the oldest when full.
    pub fn append(&mut self, sample: PriceSample) -> MarketDataResult<()> {
        if let Err(e) = self.validate(&sample) {
            log::warn!("Rejected price sample: {}", e);
            return Err(e);
        }

        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);

        Ok(())
    }

    /// Immutable copy of the retained samples, oldest first.
    pub fn snapshot(&self) -> PriceSnapshot {
        PriceSnapshot {
            samples: self.samples.iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.back()
    }

    fn validate(&self, sample: &PriceSample) -> MarketDataResult<()> {
        let price = sample.price;
        if !price.is_finite()
            || price <= 0.0
            || price < self.min_valid_price
            || price > self.max_valid_price
        {
            return Err(MarketDataError::InvalidPrice {
                price,
                min: self.min_valid_price,
                max: self.max_valid_price,
            });
        }

        for (name, value) in [
            ("high", sample.high),
            ("low", sample.low),
            ("volume", sample.volume),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(MarketDataError::InvalidSample(format!(
                        "{} must be finite and non-negative, got {}",
                        name, v
                    )));
                }
            }
        }

        if let (Some(high), Some(low)) = (sample.high, sample.low) {
            if high < low {
                return Err(MarketDataError::InvalidSample(format!(
                    "high {} is below low {}",
                    high, low
                )));
            }
        }

        if let Some(newest) = self.samples.back() {
            if sample.timestamp < newest.timestamp {
                return Err(MarketDataError::OutOfOrder {
                    timestamp: sample.timestamp.to_rfc3339(),
                    newest: newest.timestamp.to_rfc3339(),
                });
            }
        }

        Ok(())
    }
}

/// Frozen view of the window taken at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSnapshot {
    samples: Vec<PriceSample>,
}

impl PriceSnapshot {
    pub fn from_samples(samples: Vec<PriceSample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.last()
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.samples.last().map(|s| s.price)
    }

    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.last().map(|s| s.timestamp)
    }

    pub fn close_prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.price).collect()
    }

    /// High prices, only when every sample carries one.
    pub fn high_prices(&self) -> Option<Vec<f64>> {
        self.samples.iter().map(|s| s.high).collect()
    }

    /// Low prices, only when every sample carries one.
    pub fn low_prices(&self) -> Option<Vec<f64>> {
        self.samples.iter().map(|s| s.low).collect()
    }

    pub fn volumes(&self) -> Option<Vec<f64>> {
        self.samples.iter().map(|s| s.volume).collect()
    }
}
