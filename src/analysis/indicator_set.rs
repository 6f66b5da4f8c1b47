// src/analysis/indicator_set.rs
use crate::analysis::indicators::{self, BollingerBands, KeyLevels};
use crate::config::IndicatorConfig;
use crate::domain::errors::AnalysisResult;
use crate::market_data::PriceSnapshot;
use serde::{Deserialize, Serialize};

/// Indicator values computed from one window snapshot.
///
/// Every field is `None` when the window holds too few samples for it;
/// no field ever carries a substitute value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub sample_count: usize,
    pub current_price: Option<f64>,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    /// Fast EMA (12 by default)
    pub ema_fast: Option<f64>,
    /// Slow EMA (26 by default)
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bollinger: Option<BollingerBands>,
    pub key_levels: Option<KeyLevels>,
    pub volatility_pct: Option<f64>,
    pub atr: Option<f64>,
}

impl IndicatorSet {
    pub fn support_levels(&self) -> &[f64] {
        self.key_levels
            .as_ref()
            .map(|l| l.support.as_slice())
            .unwrap_or(&[])
    }

    pub fn resistance_levels(&self) -> &[f64] {
        self.key_levels
            .as_ref()
            .map(|l| l.resistance.as_slice())
            .unwrap_or(&[])
    }
}

fn latest(series: AnalysisResult<Vec<f64>>) -> Option<f64> {
    series.ok().and_then(|values| values.last().copied())
}

/// Compute every indicator from a snapshot. Pure; safe to call repeatedly.
pub fn compute_all(snapshot: &PriceSnapshot, config: &IndicatorConfig) -> IndicatorSet {
    let prices = snapshot.close_prices();

    let macd = indicators::calculate_macd(
        &prices,
        config.ema_fast,
        config.ema_slow,
        config.macd_signal,
    )
    .ok();
    let (macd_signal, macd_histogram) = match &macd {
        Some((_, signal, histogram)) => (signal.last().copied(), histogram.last().copied()),
        None => (None, None),
    };

    let atr = match (snapshot.high_prices(), snapshot.low_prices()) {
        (Some(highs), Some(lows)) => {
            indicators::calculate_atr(&highs, &lows, &prices, config.atr_period).ok()
        }
        _ => None,
    };

    let set = IndicatorSet {
        sample_count: prices.len(),
        current_price: snapshot.latest_price(),
        sma_short: latest(indicators::calculate_sma(&prices, config.sma_short)),
        sma_long: latest(indicators::calculate_sma(&prices, config.sma_long)),
        ema_fast: latest(indicators::calculate_ema(&prices, config.ema_fast)),
        ema_slow: latest(indicators::calculate_ema(&prices, config.ema_slow)),
        rsi: indicators::calculate_rsi(&prices, config.rsi_period).ok(),
        macd_line: latest(indicators::calculate_macd_line(
            &prices,
            config.ema_fast,
            config.ema_slow,
        )),
        macd_signal,
        macd_histogram,
        bollinger: indicators::calculate_bollinger_bands(
            &prices,
            config.bollinger_period,
            config.bollinger_k,
        )
        .ok(),
        key_levels: indicators::calculate_support_resistance(
            &prices,
            config.support_resistance_lookback,
        )
        .ok(),
        volatility_pct: indicators::calculate_volatility(&prices, config.volatility_window).ok(),
        atr,
    };

    log::debug!(
        "Indicators over {} samples: sma {:?}/{:?}, rsi {:?}, macd {:?}/{:?}",
        set.sample_count,
        set.sma_short,
        set.sma_long,
        set.rsi,
        set.macd_line,
        set.macd_signal
    );

    set
}
