// src/analysis/outlook.rs
//! Descriptive market readings shown next to the recommendation.
//!
//! Nothing here feeds back into the combiner score.

use crate::analysis::indicator_set::IndicatorSet;
use crate::analysis::indicators;
use crate::config::ScoringConfig;
use crate::domain::models::RiskLevel;
use serde::{Deserialize, Serialize};

const TREND_FAST_EMA: usize = 20;
const TREND_SLOW_EMA: usize = 50;
const STRONG_TREND_SPREAD_PCT: f64 = 3.0;

const REGIME_LOOKBACK: usize = 20;
const TRENDING_CHANGE_PCT: f64 = 8.0;
const SIDEWAYS_RETURN_STD_PCT: f64 = 1.0;
const VOLATILE_RETURN_STD_PCT: f64 = 2.5;

const SETUP_RSI_PERIOD: usize = 10;
const SETUP_SHORT_LOOKBACK: usize = 5;
const SETUP_MEDIUM_LOOKBACK: usize = 15;

const MAX_REVERSAL_PCT: f64 = 80.0;

const RSI_TREND_PERIOD: usize = 14;
const EXHAUSTION_LOOKBACK: usize = 10;
const BUYER_MOMENTUM_LOOKBACK: usize = 5;
const PRESSURE_MOVES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendClass {
    StrongUptrend,
    Uptrend,
    Downtrend,
    StrongDowntrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub class: TrendClass,
    /// Distance between the two EMAs, in percent
    pub spread_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketRegime {
    Trending,
    Sideways,
    Volatile,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Likelihood {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReversalOdds {
    pub probability_pct: f64,
    pub likelihood: Likelihood,
}

/// Oversold-bounce entry conditions: short RSI below the oversold line,
/// a green candle, and mostly rising prices over two lookbacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OversoldSetup {
    pub rsi: Option<f64>,
    pub rsi_oversold: bool,
    pub green_candle: bool,
    pub bullish_short: bool,
    pub bullish_medium: bool,
}

impl OversoldSetup {
    pub fn is_active(&self) -> bool {
        self.rsi_oversold && self.green_candle && self.bullish_short && self.bullish_medium
    }
}

/// Direction of the last three RSI readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiTrend {
    Rising,
    Falling,
    Neutral,
}

/// Share of the recent window without a down move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SellerExhaustion {
    pub score: f64,
    pub level: Likelihood,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MomentumStrength {
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyerMomentum {
    pub change_pct: f64,
    pub strength: MomentumStrength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentClass {
    StrongBullish,
    Bullish,
    Neutral,
}

/// Bullish-only tally of the oversold, trend, MACD and pressure readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSentiment {
    pub score: i32,
    pub class: SentimentClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOutlook {
    pub trend: Option<TrendReading>,
    pub regime: Option<MarketRegime>,
    pub strength: Option<(f64, TrendStrength)>,
    pub reversal: ReversalOdds,
    pub oversold_setup: OversoldSetup,
    pub risk_level: Option<RiskLevel>,
    pub win_rate_pct: f64,
    pub rsi_trend: Option<RsiTrend>,
    pub seller_exhaustion: Option<SellerExhaustion>,
    pub buyer_momentum: Option<BuyerMomentum>,
    pub sentiment: MarketSentiment,
}

pub fn assess(prices: &[f64], set: &IndicatorSet, scoring: &ScoringConfig) -> MarketOutlook {
    let oversold_setup = oversold_setup(prices, scoring.rsi_oversold);

    MarketOutlook {
        trend: classify_trend(prices),
        regime: detect_regime(prices),
        strength: trend_strength(prices),
        reversal: reversal_odds(prices, set, scoring),
        risk_level: set.volatility_pct.map(|v| classify_risk(v, scoring)),
        win_rate_pct: win_rate(set, &oversold_setup),
        rsi_trend: rsi_trend(prices),
        seller_exhaustion: seller_exhaustion(prices),
        buyer_momentum: buyer_momentum(prices),
        sentiment: market_sentiment(prices, set, &oversold_setup, scoring),
        oversold_setup,
    }
}

/// EMA 20 against EMA 50; `None` until both exist.
pub fn classify_trend(prices: &[f64]) -> Option<TrendReading> {
    let fast = indicators::calculate_ema(prices, TREND_FAST_EMA).ok()?;
    let slow = indicators::calculate_ema(prices, TREND_SLOW_EMA).ok()?;
    let (fast, slow) = (*fast.last()?, *slow.last()?);

    let reading = if fast > slow {
        let spread_pct = (fast - slow) / slow * 100.0;
        let class = if spread_pct > STRONG_TREND_SPREAD_PCT {
            TrendClass::StrongUptrend
        } else {
            TrendClass::Uptrend
        };
        TrendReading { class, spread_pct }
    } else {
        let spread_pct = (slow - fast) / fast * 100.0;
        let class = if spread_pct > STRONG_TREND_SPREAD_PCT {
            TrendClass::StrongDowntrend
        } else {
            TrendClass::Downtrend
        };
        TrendReading { class, spread_pct }
    };

    Some(reading)
}

pub fn detect_regime(prices: &[f64]) -> Option<MarketRegime> {
    if prices.len() < REGIME_LOOKBACK {
        return None;
    }
    let recent = &prices[prices.len() - REGIME_LOOKBACK..];

    let change_pct = (recent[recent.len() - 1] - recent[0]) / recent[0] * 100.0;
    let returns: Vec<f64> = recent.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
    let return_std_pct = indicators::population_std_dev(&returns).ok()? * 100.0;

    let regime = if change_pct.abs() > TRENDING_CHANGE_PCT {
        MarketRegime::Trending
    } else if return_std_pct < SIDEWAYS_RETURN_STD_PCT {
        MarketRegime::Sideways
    } else if return_std_pct > VOLATILE_RETURN_STD_PCT {
        MarketRegime::Volatile
    } else {
        MarketRegime::Normal
    };

    Some(regime)
}

/// Directional consistency of the last 20 moves weighted by their size.
pub fn trend_strength(prices: &[f64]) -> Option<(f64, TrendStrength)> {
    if prices.len() < REGIME_LOOKBACK {
        return None;
    }
    let recent = &prices[prices.len() - REGIME_LOOKBACK..];
    let changes: Vec<f64> = recent.windows(2).map(|w| w[1] - w[0]).collect();
    let half = changes.len() as f64 / 2.0;

    let up_moves = changes.iter().filter(|c| **c > 0.0).count() as f64;
    let consistency = (up_moves - half).abs() / half;
    let avg_move_pct = changes.iter().sum::<f64>().abs() / changes.len() as f64 / recent[0] * 100.0;

    let score = consistency * (avg_move_pct * 10.0).min(1.0);
    let strength = match score {
        s if s > 0.7 => TrendStrength::VeryStrong,
        s if s > 0.5 => TrendStrength::Strong,
        s if s > 0.3 => TrendStrength::Moderate,
        _ => TrendStrength::Weak,
    };

    Some((score, strength))
}

pub fn reversal_odds(prices: &[f64], set: &IndicatorSet, scoring: &ScoringConfig) -> ReversalOdds {
    let mut score = 0.0;

    if let Some(rsi) = set.rsi {
        if rsi < scoring.rsi_oversold - 5.0 || rsi > scoring.rsi_overbought + 5.0 {
            score += 0.6;
        } else if rsi < scoring.rsi_oversold || rsi > scoring.rsi_overbought {
            score += 0.3;
        }
    }

    if let (Some(bands), Some(price)) = (set.bollinger, set.current_price) {
        if price > bands.upper || price < bands.lower {
            score += 0.4;
        }
    }

    // four consecutive moves in the same direction
    if prices.len() >= 5 {
        let tail = &prices[prices.len() - 5..];
        let ups = tail.windows(2).filter(|w| w[1] > w[0]).count();
        let downs = tail.windows(2).filter(|w| w[1] < w[0]).count();
        if ups == 4 || downs == 4 {
            score += 0.3;
        }
    }

    let probability_pct = (score * 100.0_f64).min(MAX_REVERSAL_PCT);
    let likelihood = if probability_pct > 60.0 {
        Likelihood::High
    } else if probability_pct > 40.0 {
        Likelihood::Medium
    } else {
        Likelihood::Low
    };

    ReversalOdds {
        probability_pct,
        likelihood,
    }
}

pub fn oversold_setup(prices: &[f64], rsi_oversold: f64) -> OversoldSetup {
    let rsi = indicators::calculate_rsi(prices, SETUP_RSI_PERIOD).ok();
    let green_candle = prices.len() >= 2 && prices[prices.len() - 1] > prices[prices.len() - 2];

    OversoldSetup {
        rsi,
        rsi_oversold: rsi.map_or(false, |r| r < rsi_oversold),
        green_candle,
        bullish_short: is_bullish(prices, SETUP_SHORT_LOOKBACK),
        bullish_medium: is_bullish(prices, SETUP_MEDIUM_LOOKBACK),
    }
}

/// Mean of the last three prices above the mean of the last `lookback`.
///
/// Needs `lookback + 1` prices.
fn is_bullish(prices: &[f64], lookback: usize) -> bool {
    if lookback == 0 || prices.len() < lookback + 1 {
        return false;
    }
    let recent = &prices[prices.len() - lookback..];
    let short = &recent[recent.len().saturating_sub(3)..];

    let short_mean = short.iter().sum::<f64>() / short.len() as f64;
    let long_mean = recent.iter().sum::<f64>() / recent.len() as f64;
    short_mean > long_mean
}

/// RSI(14) on the current window and the two windows before it.
pub fn rsi_trend(prices: &[f64]) -> Option<RsiTrend> {
    let n = prices.len();
    if n < RSI_TREND_PERIOD + 3 {
        return None;
    }
    let oldest = indicators::calculate_rsi(&prices[..n - 2], RSI_TREND_PERIOD).ok()?;
    let middle = indicators::calculate_rsi(&prices[..n - 1], RSI_TREND_PERIOD).ok()?;
    let current = indicators::calculate_rsi(prices, RSI_TREND_PERIOD).ok()?;

    let trend = if current > middle && middle > oldest {
        RsiTrend::Rising
    } else if current < middle && middle < oldest {
        RsiTrend::Falling
    } else {
        RsiTrend::Neutral
    };
    Some(trend)
}

pub fn seller_exhaustion(prices: &[f64]) -> Option<SellerExhaustion> {
    if prices.len() < EXHAUSTION_LOOKBACK {
        return None;
    }
    let recent = &prices[prices.len() - EXHAUSTION_LOOKBACK..];
    let down_moves = recent.windows(2).filter(|w| w[1] < w[0]).count();

    // scored against the sample count, so a full window of drops still leaves 0.1
    let score = (recent.len() - down_moves) as f64 / recent.len() as f64;
    let level = if score > 0.7 {
        Likelihood::High
    } else if score > 0.5 {
        Likelihood::Medium
    } else {
        Likelihood::Low
    };

    Some(SellerExhaustion { score, level })
}

pub fn buyer_momentum(prices: &[f64]) -> Option<BuyerMomentum> {
    if prices.len() < BUYER_MOMENTUM_LOOKBACK {
        return None;
    }
    let recent = &prices[prices.len() - BUYER_MOMENTUM_LOOKBACK..];
    if recent[0] <= 0.0 {
        return None;
    }
    let change_pct = (recent[recent.len() - 1] - recent[0]) / recent[0] * 100.0;

    let strength = match change_pct {
        c if c > 0.3 => MomentumStrength::Strong,
        c if c > 0.1 => MomentumStrength::Medium,
        _ => MomentumStrength::Weak,
    };

    Some(BuyerMomentum {
        change_pct,
        strength,
    })
}

/// At least three of the last five moves went up.
fn buying_pressure(prices: &[f64]) -> bool {
    if prices.len() < PRESSURE_MOVES {
        return false;
    }
    let tail = &prices[prices.len().saturating_sub(PRESSURE_MOVES + 1)..];
    tail.windows(2).filter(|w| w[1] > w[0]).count() >= 3
}

pub fn market_sentiment(
    prices: &[f64],
    set: &IndicatorSet,
    setup: &OversoldSetup,
    scoring: &ScoringConfig,
) -> MarketSentiment {
    let mut score = 0;

    if let Some(rsi) = set.rsi {
        if rsi < scoring.rsi_oversold {
            score += 2;
        } else if rsi <= scoring.rsi_buy_band {
            score += 1;
        }
    }

    if setup.bullish_short && setup.bullish_medium {
        score += 1;
    }

    let macd_bullish = match (set.macd_line, set.macd_signal) {
        (Some(line), Some(signal)) => line > signal,
        (Some(line), None) => line > 0.0,
        _ => false,
    };
    if macd_bullish {
        score += 1;
    }

    if buying_pressure(prices) {
        score += 1;
    }

    let class = if score >= 4 {
        SentimentClass::StrongBullish
    } else if score >= 2 {
        SentimentClass::Bullish
    } else {
        SentimentClass::Neutral
    };

    MarketSentiment { score, class }
}

pub fn classify_risk(volatility_pct: f64, scoring: &ScoringConfig) -> RiskLevel {
    if volatility_pct < scoring.volatility_medium_pct {
        RiskLevel::Low
    } else if volatility_pct <= scoring.volatility_high_pct {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Heuristic hit-rate estimate, clamped to [40, 85].
pub fn win_rate(set: &IndicatorSet, setup: &OversoldSetup) -> f64 {
    let mut rate: f64 = 65.0;

    if setup.is_active() {
        rate += 20.0;
    }

    if let Some(rsi) = set.rsi {
        if (30.0..=70.0).contains(&rsi) {
            rate += 10.0;
        } else if !(20.0..=80.0).contains(&rsi) {
            rate -= 15.0;
        }
    }

    if let (Some(short), Some(long)) = (set.sma_short, set.sma_long) {
        if short > long {
            rate += 5.0;
        }
    }

    rate.clamp(40.0, 85.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::indicators::BollingerBands;

    fn ramp(from: f64, to: f64, n: usize) -> Vec<f64> {
        let step = (to - from) / (n - 1) as f64;
        (0..n).map(|i| from + step * i as f64).collect()
    }

    #[test]
    fn trend_needs_fifty_samples() {
        assert_eq!(classify_trend(&ramp(100.0, 110.0, 49)), None);

        let up = classify_trend(&ramp(100.0, 200.0, 60)).unwrap();
        assert_eq!(up.class, TrendClass::StrongUptrend);

        let down = classify_trend(&ramp(100.0, 99.0, 60)).unwrap();
        assert_eq!(down.class, TrendClass::Downtrend);
        assert!(down.spread_pct < STRONG_TREND_SPREAD_PCT);
    }

    #[test]
    fn regime_classification() {
        assert_eq!(detect_regime(&[100.0; 19]), None);
        assert_eq!(detect_regime(&[100.0; 20]), Some(MarketRegime::Sideways));
        assert_eq!(
            detect_regime(&ramp(100.0, 120.0, 20)),
            Some(MarketRegime::Trending)
        );

        let choppy: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 104.0 })
            .collect();
        assert_eq!(detect_regime(&choppy), Some(MarketRegime::Volatile));
    }

    #[test]
    fn steady_climb_is_a_very_strong_trend() {
        let (score, strength) = trend_strength(&ramp(100.0, 120.0, 20)).unwrap();
        assert!(score > 0.7);
        assert_eq!(strength, TrendStrength::VeryStrong);

        let (_, flat) = trend_strength(&[100.0; 20]).unwrap();
        assert_eq!(flat, TrendStrength::Weak);
    }

    #[test]
    fn reversal_odds_are_capped() {
        let set = IndicatorSet {
            rsi: Some(10.0),
            current_price: Some(90.0),
            bollinger: Some(BollingerBands {
                upper: 110.0,
                middle: 100.0,
                lower: 95.0,
            }),
            ..IndicatorSet::default()
        };
        let prices = [100.0, 98.0, 96.0, 94.0, 90.0];
        let odds = reversal_odds(&prices, &set, &ScoringConfig::default());
        assert_eq!(odds.probability_pct, MAX_REVERSAL_PCT);
        assert_eq!(odds.likelihood, Likelihood::High);

        let calm = reversal_odds(&[100.0; 5], &IndicatorSet::default(), &ScoringConfig::default());
        assert_eq!(calm.probability_pct, 0.0);
        assert_eq!(calm.likelihood, Likelihood::Low);
    }

    #[test]
    fn oversold_setup_requires_every_condition() {
        // sharp drop then a short recovery
        let mut prices = ramp(130.0, 100.0, 20);
        let falling = oversold_setup(&prices, 30.0);
        assert!(falling.rsi_oversold);
        assert!(!falling.green_candle);
        assert!(!falling.is_active());

        prices.push(100.5);
        let bounce = oversold_setup(&prices, 30.0);
        assert!(bounce.green_candle);
        assert!(!bounce.bullish_medium);
        assert!(!bounce.is_active());
    }

    #[test]
    fn bullish_compares_short_and_long_means() {
        // one up move out of four, but the last three average above the window
        let spike = [100.0, 99.0, 98.0, 97.0, 96.0, 110.0];
        assert!(is_bullish(&spike, 5));

        let fading = [100.0, 104.0, 105.0, 106.0, 101.0, 100.0];
        assert!(!is_bullish(&fading, 5));

        // needs lookback + 1 prices
        assert!(!is_bullish(&[100.0, 101.0, 102.0, 103.0], 4));
        assert!(is_bullish(&[100.0, 100.0, 100.0, 101.0, 102.0], 4));
    }

    #[test]
    fn rsi_trend_follows_the_last_three_readings() {
        assert_eq!(rsi_trend(&ramp(100.0, 84.0, 16)), None);

        let mut recovering = ramp(100.0, 86.0, 15);
        recovering.extend([87.0, 88.0]);
        assert_eq!(rsi_trend(&recovering), Some(RsiTrend::Rising));

        let mut topping = ramp(86.0, 100.0, 15);
        topping.extend([99.0, 98.0]);
        assert_eq!(rsi_trend(&topping), Some(RsiTrend::Falling));

        assert_eq!(rsi_trend(&[100.0; 20]), Some(RsiTrend::Neutral));
    }

    #[test]
    fn seller_exhaustion_counts_missing_drops() {
        assert_eq!(seller_exhaustion(&[100.0; 9]), None);

        let climbing = seller_exhaustion(&ramp(100.0, 109.0, 10)).unwrap();
        assert_eq!(climbing.score, 1.0);
        assert_eq!(climbing.level, Likelihood::High);

        let dumping = seller_exhaustion(&ramp(109.0, 100.0, 10)).unwrap();
        assert!((dumping.score - 0.1).abs() < 1e-12);
        assert_eq!(dumping.level, Likelihood::Low);

        // three drops
        let mixed = [100.0, 99.0, 100.0, 99.0, 100.0, 99.0, 100.0, 101.0, 102.0, 103.0];
        let reading = seller_exhaustion(&mixed).unwrap();
        assert_eq!(reading.level, Likelihood::Medium);
    }

    #[test]
    fn buyer_momentum_bands() {
        assert_eq!(buyer_momentum(&[100.0; 4]), None);

        let strong = buyer_momentum(&[100.0, 100.0, 100.0, 100.0, 100.5]).unwrap();
        assert!((strong.change_pct - 0.5).abs() < 1e-9);
        assert_eq!(strong.strength, MomentumStrength::Strong);

        let medium = buyer_momentum(&[100.0, 100.0, 100.0, 100.0, 100.2]).unwrap();
        assert_eq!(medium.strength, MomentumStrength::Medium);

        let falling = buyer_momentum(&[100.0, 99.0, 98.0, 97.0, 96.0]).unwrap();
        assert_eq!(falling.strength, MomentumStrength::Weak);
    }

    #[test]
    fn sentiment_tallies_bullish_readings() {
        let scoring = ScoringConfig::default();
        let prices = ramp(100.0, 110.0, 20);
        let setup = oversold_setup(&prices, scoring.rsi_oversold);
        assert!(setup.bullish_short && setup.bullish_medium);

        let oversold = IndicatorSet {
            rsi: Some(25.0),
            macd_line: Some(1.0),
            macd_signal: Some(0.5),
            ..IndicatorSet::default()
        };
        let strong = market_sentiment(&prices, &oversold, &setup, &scoring);
        assert_eq!(strong.score, 5);
        assert_eq!(strong.class, SentimentClass::StrongBullish);

        let flat = [100.0; 20];
        let quiet = IndicatorSet {
            rsi: Some(50.0),
            macd_line: Some(0.0),
            macd_signal: Some(0.0),
            ..IndicatorSet::default()
        };
        let flat_setup = oversold_setup(&flat, scoring.rsi_oversold);
        let neutral = market_sentiment(&flat, &quiet, &flat_setup, &scoring);
        assert_eq!(neutral.score, 0);
        assert_eq!(neutral.class, SentimentClass::Neutral);

        let near_oversold = IndicatorSet {
            rsi: Some(35.0),
            macd_line: Some(0.2),
            macd_signal: None,
            ..IndicatorSet::default()
        };
        let bullish = market_sentiment(&flat, &near_oversold, &flat_setup, &scoring);
        assert_eq!(bullish.score, 2);
        assert_eq!(bullish.class, SentimentClass::Bullish);
    }

    #[test]
    fn assess_fills_short_window_readings() {
        let prices = ramp(100.0, 110.0, 20);
        let outlook = assess(&prices, &IndicatorSet::default(), &ScoringConfig::default());
        assert_eq!(outlook.rsi_trend, Some(RsiTrend::Neutral));
        assert_eq!(outlook.seller_exhaustion.unwrap().level, Likelihood::High);
        assert_eq!(outlook.buyer_momentum.unwrap().strength, MomentumStrength::Strong);
        assert_eq!(outlook.trend, None);

        let empty = assess(&[], &IndicatorSet::default(), &ScoringConfig::default());
        assert_eq!(empty.rsi_trend, None);
        assert_eq!(empty.sentiment.class, SentimentClass::Neutral);
    }

    #[test]
    fn risk_levels_follow_thresholds() {
        let scoring = ScoringConfig::default();
        assert_eq!(classify_risk(0.0, &scoring), RiskLevel::Low);
        assert_eq!(classify_risk(2.99, &scoring), RiskLevel::Low);
        assert_eq!(classify_risk(3.0, &scoring), RiskLevel::Medium);
        assert_eq!(classify_risk(7.0, &scoring), RiskLevel::Medium);
        assert_eq!(classify_risk(7.01, &scoring), RiskLevel::High);
    }

    #[test]
    fn win_rate_is_clamped() {
        let calm = IndicatorSet {
            rsi: Some(50.0),
            sma_short: Some(101.0),
            sma_long: Some(100.0),
            ..IndicatorSet::default()
        };
        assert_eq!(win_rate(&calm, &OversoldSetup::default()), 80.0);

        let active = OversoldSetup {
            rsi: Some(25.0),
            rsi_oversold: true,
            green_candle: true,
            bullish_short: true,
            bullish_medium: true,
        };
        assert_eq!(win_rate(&calm, &active), 85.0);

        let extreme = IndicatorSet {
            rsi: Some(95.0),
            ..IndicatorSet::default()
        };
        assert_eq!(win_rate(&extreme, &OversoldSetup::default()), 50.0);
    }
}
