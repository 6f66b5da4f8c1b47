// src/analysis/indicators.rs
use crate::domain::errors::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use ta::indicators::StandardDeviation;
use ta::Next;

fn require(indicator: &'static str, available: usize, required: usize) -> AnalysisResult<()> {
    if required == 0 {
        return Err(AnalysisError::DegenerateMath(format!(
            "{} period must be positive",
            indicator
        )));
    }
    if available < required {
        return Err(AnalysisError::InsufficientData {
            indicator,
            required,
            available,
        });
    }
    Ok(())
}

/// Simple Moving Average (SMA)
pub fn calculate_sma(prices: &[f64], period: usize) -> AnalysisResult<Vec<f64>> {
    require("SMA", prices.len(), period)?;

    let mut result = Vec::with_capacity(prices.len() - period + 1);
    let mut sum = prices.iter().take(period).sum::<f64>();

    // First SMA value
    result.push(sum / period as f64);

    // Calculate remaining values with sliding window
    for i in period..prices.len() {
        sum = sum - prices[i - period] + prices[i];
        result.push(sum / period as f64);
    }

    Ok(result)
}

/// Exponential Moving Average (EMA), seeded with the SMA of the first `period` prices
pub fn calculate_ema(prices: &[f64], period: usize) -> AnalysisResult<Vec<f64>> {
    require("EMA", prices.len(), period)?;

    let multiplier = 2.0 / (period + 1) as f64;
    let mut result = Vec::with_capacity(prices.len() - period + 1);

    // First EMA value is SMA
    let first_sma = prices.iter().take(period).sum::<f64>() / period as f64;
    result.push(first_sma);

    for &price in &prices[period..] {
        let previous_ema = result[result.len() - 1];
        // price*a + prev*(1-a), written so a flat series stays exactly flat
        result.push((price - previous_ema) * multiplier + previous_ema);
    }

    Ok(result)
}

/// Relative Strength Index (RSI) with Wilder smoothing
///
/// Needs `period + 1` prices. A window with no movement at all has no
/// meaningful gain/loss ratio and reads as a neutral 50; zero average loss
/// with some gain reads as 100.
pub fn calculate_rsi(prices: &[f64], period: usize) -> AnalysisResult<f64> {
    require("RSI", prices.len(), period + 1)?;
    if period == 0 {
        return Err(AnalysisError::DegenerateMath(
            "RSI period must be positive".to_string(),
        ));
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);

    // Calculate price changes
    for pair in prices.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    // Calculate initial averages
    let mut avg_gain = gains.iter().take(period).sum::<f64>() / period as f64;
    let mut avg_loss = losses.iter().take(period).sum::<f64>() / period as f64;

    // Smooth averages for the remaining periods
    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
    }

    if avg_loss == 0.0 {
        return Ok(if avg_gain == 0.0 { 50.0 } else { 100.0 });
    }

    let rs = avg_gain / avg_loss;
    Ok((100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0))
}

/// MACD line series: fast EMA minus slow EMA, aligned on the slow EMA's samples
pub fn calculate_macd_line(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
) -> AnalysisResult<Vec<f64>> {
    if fast_period >= slow_period {
        return Err(AnalysisError::DegenerateMath(format!(
            "MACD fast period {} must be below slow period {}",
            fast_period, slow_period
        )));
    }
    require("MACD", prices.len(), slow_period)?;

    let fast_ema = calculate_ema(prices, fast_period)?;
    let slow_ema = calculate_ema(prices, slow_period)?;

    // Align the EMAs (the fast series starts earlier)
    let offset = slow_period - fast_period;
    Ok(fast_ema[offset..]
        .iter()
        .zip(slow_ema.iter())
        .map(|(fast, slow)| fast - slow)
        .collect())
}

/// MACD (Moving Average Convergence Divergence)
///
/// Returns `(macd_line, signal_line, histogram)`; the signal line is an EMA
/// of the MACD line series, so the signal and histogram series are shorter
/// than the line by `signal_period - 1`.
pub fn calculate_macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> AnalysisResult<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    require(
        "MACD signal",
        prices.len(),
        (slow_period + signal_period).saturating_sub(1),
    )?;

    let macd_line = calculate_macd_line(prices, fast_period, slow_period)?;
    let signal_line = calculate_ema(&macd_line, signal_period)?;

    let offset = signal_period - 1;
    let histogram: Vec<f64> = macd_line[offset..]
        .iter()
        .zip(signal_line.iter())
        .map(|(macd, signal)| macd - signal)
        .collect();

    Ok((macd_line, signal_line, histogram))
}

/// Population standard deviation of `values`
pub fn population_std_dev(values: &[f64]) -> AnalysisResult<f64> {
    let mut std_dev = StandardDeviation::new(values.len())
        .map_err(|e| AnalysisError::DegenerateMath(format!("standard deviation: {:?}", e)))?;

    let mut result = 0.0;
    for &value in values {
        result = std_dev.next(value);
    }
    Ok(result)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBands {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Bollinger Bands over the trailing `period` prices
pub fn calculate_bollinger_bands(
    prices: &[f64],
    period: usize,
    std_dev_multiplier: f64,
) -> AnalysisResult<BollingerBands> {
    require("Bollinger Bands", prices.len(), period)?;

    let window = &prices[prices.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;
    let std_dev = population_std_dev(window)?;

    Ok(BollingerBands {
        upper: middle + std_dev_multiplier * std_dev,
        middle,
        lower: middle - std_dev_multiplier * std_dev,
    })
}

/// Reference levels derived from the recent trading range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyLevels {
    /// Levels below the current price, nearest first
    pub support: Vec<f64>,

    /// Levels above the current price, nearest first
    pub resistance: Vec<f64>,
}

impl KeyLevels {
    pub fn nearest_support(&self) -> Option<f64> {
        self.support.iter().copied().reduce(f64::max)
    }

    pub fn nearest_resistance(&self) -> Option<f64> {
        self.resistance.iter().copied().reduce(f64::min)
    }
}

/// Support and resistance from the high/low of the trailing `lookback` prices
pub fn calculate_support_resistance(prices: &[f64], lookback: usize) -> AnalysisResult<KeyLevels> {
    require("Support/Resistance", prices.len(), lookback)?;

    let recent = &prices[prices.len() - lookback..];
    let current_price = prices[prices.len() - 1];
    let recent_high = recent.iter().copied().fold(f64::MIN, f64::max);
    let recent_low = recent.iter().copied().fold(f64::MAX, f64::min);
    let range = recent_high - recent_low;

    let support = [recent_low, recent_low - range * 0.1, recent_low - range * 0.2]
        .into_iter()
        .filter(|level| *level < current_price)
        .collect();
    let resistance = [
        recent_high,
        recent_high + range * 0.1,
        recent_high + range * 0.2,
    ]
    .into_iter()
    .filter(|level| *level > current_price)
    .collect();

    Ok(KeyLevels {
        support,
        resistance,
    })
}

/// Coefficient of variation of the trailing `window` prices, in percent
pub fn calculate_volatility(prices: &[f64], window: usize) -> AnalysisResult<f64> {
    require("Volatility", prices.len(), window)?;

    let recent = &prices[prices.len() - window..];
    let mean = recent.iter().sum::<f64>() / window as f64;
    if mean == 0.0 {
        return Err(AnalysisError::DegenerateMath(
            "volatility of a zero-mean window".to_string(),
        ));
    }

    Ok(population_std_dev(recent)? / mean * 100.0)
}

/// Average True Range (ATR): mean of the last `period` true ranges
pub fn calculate_atr(
    high_prices: &[f64],
    low_prices: &[f64],
    close_prices: &[f64],
    period: usize,
) -> AnalysisResult<f64> {
    let available = high_prices
        .len()
        .min(low_prices.len())
        .min(close_prices.len());
    require("ATR", available, period + 1)?;

    // Calculate true ranges
    let true_ranges: Vec<f64> = (1..available)
        .map(|i| {
            let tr1 = high_prices[i] - low_prices[i];
            let tr2 = (high_prices[i] - close_prices[i - 1]).abs();
            let tr3 = (low_prices[i] - close_prices[i - 1]).abs();
            tr1.max(tr2).max(tr3)
        })
        .collect();

    let recent = &true_ranges[true_ranges.len() - period..];
    Ok(recent.iter().sum::<f64>() / period as f64)
}

/// Percent change across the trailing `window` prices
pub fn percent_change(prices: &[f64], window: usize) -> Option<f64> {
    if window < 2 || prices.len() < window {
        return None;
    }

    let first = prices[prices.len() - window];
    let last = prices[prices.len() - 1];
    if first == 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}
