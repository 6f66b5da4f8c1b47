// src/trading/signals.rs
use crate::analysis::indicator_set::IndicatorSet;
use crate::analysis::indicators;
use crate::config::{Config, IndicatorConfig, ScoringConfig};
use crate::domain::models::{Recommendation, RecommendationLabel, Signal};

/// Scores an indicator set into a recommendation.
///
/// Each rule appends one signal and adds its strength to a running score;
/// the label and confidence are pure functions of that score. Indicators
/// that are `None` are skipped.
#[derive(Debug, Clone)]
pub struct SignalCombiner {
    indicators: IndicatorConfig,
    scoring: ScoringConfig,
}

impl SignalCombiner {
    pub fn new(indicators: IndicatorConfig, scoring: ScoringConfig) -> Self {
        Self {
            indicators,
            scoring,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.indicators.clone(), config.scoring.clone())
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn evaluate(
        &self,
        set: &IndicatorSet,
        current_price: f64,
        recent_prices: &[f64],
    ) -> Recommendation {
        let required = self.indicators.required_history();
        if set.sample_count < required {
            return self.hold_with(
                current_price,
                Signal::neutral(
                    "Insufficient history",
                    format!(
                        "Gathering market data ({}/{} samples)",
                        set.sample_count, required
                    ),
                ),
            );
        }

        if !current_price.is_finite() || current_price <= 0.0 {
            return self.hold_with(
                current_price,
                Signal::neutral("Degenerate input", "Current price is not usable"),
            );
        }

        let mut signals = Vec::new();

        if let (Some(short), Some(long)) = (set.sma_short, set.sma_long) {
            signals.push(crossover("Trend", short, long));
        }
        if self.scoring.ema_trend_confirmation {
            if let (Some(fast), Some(slow)) = (set.ema_fast, set.ema_slow) {
                signals.push(crossover("Fast trend", fast, slow));
            }
        }
        if let Some(rsi) = set.rsi {
            signals.push(self.rsi_signal(rsi));
        }
        if let Some(signal) = macd_signal(set) {
            signals.push(signal);
        }
        if let Some(signal) = bollinger_signal(set, current_price) {
            signals.push(signal);
        }
        if let Some(signal) = self.momentum_signal(recent_prices) {
            signals.push(signal);
        }

        let score: i32 = signals.iter().map(|s| s.strength).sum();

        Recommendation {
            label: self.label_for(score),
            score,
            confidence: self.confidence_for(score),
            signals,
            price: current_price,
            timestamp: None,
        }
    }

    pub fn label_for(&self, score: i32) -> RecommendationLabel {
        let s = &self.scoring;
        if score >= s.strong_buy_score {
            RecommendationLabel::StrongBuy
        } else if score >= s.buy_score {
            RecommendationLabel::Buy
        } else if score <= s.strong_sell_score {
            RecommendationLabel::StrongSell
        } else if score <= s.sell_score {
            RecommendationLabel::Sell
        } else {
            RecommendationLabel::Hold
        }
    }

    /// `base + |score| * per_point`, capped at `max_confidence`.
    pub fn confidence_for(&self, score: i32) -> f64 {
        let s = &self.scoring;
        let raw = s.confidence_base + score.unsigned_abs() as f64 * s.confidence_per_point;
        raw.clamp(0.0, s.max_confidence)
    }

    fn hold_with(&self, current_price: f64, signal: Signal) -> Recommendation {
        Recommendation {
            label: RecommendationLabel::Hold,
            score: 0,
            confidence: self.scoring.insufficient_confidence,
            signals: vec![signal],
            price: current_price,
            timestamp: None,
        }
    }

    fn rsi_signal(&self, rsi: f64) -> Signal {
        let s = &self.scoring;
        if rsi < s.rsi_oversold {
            Signal::new(
                "RSI",
                s.rsi_oversold_weight,
                format!("Oversold (RSI {:.1}) - strong buy bias", rsi),
            )
        } else if rsi > s.rsi_overbought {
            Signal::new(
                "RSI",
                -s.rsi_overbought_weight,
                format!("Overbought (RSI {:.1}) - caution", rsi),
            )
        } else if rsi < s.rsi_buy_band {
            Signal::new(
                "RSI",
                s.rsi_band_weight,
                format!("RSI {:.1} leaning oversold", rsi),
            )
        } else if rsi > s.rsi_sell_band {
            Signal::new(
                "RSI",
                -s.rsi_band_weight,
                format!("RSI {:.1} leaning overbought", rsi),
            )
        } else {
            Signal::neutral("RSI", format!("RSI {:.1} in neutral range", rsi))
        }
    }

    fn momentum_signal(&self, recent_prices: &[f64]) -> Option<Signal> {
        let s = &self.scoring;
        let change = indicators::percent_change(recent_prices, s.momentum_window)?;

        if change > s.momentum_threshold_pct {
            Some(Signal::new(
                "Momentum",
                1,
                format!("Up {:.1}% recently", change),
            ))
        } else if change < -s.momentum_threshold_pct {
            Some(Signal::new(
                "Momentum",
                -1,
                format!("Down {:.1}% recently", change.abs()),
            ))
        } else {
            None
        }
    }
}

fn crossover(title: &str, short: f64, long: f64) -> Signal {
    if short > long {
        Signal::new(title, 1, format!("{}: bullish crossover", title))
    } else if short < long {
        Signal::new(title, -1, format!("{}: bearish crossover", title))
    } else {
        Signal::neutral(title, format!("{}: averages level", title))
    }
}

fn macd_signal(set: &IndicatorSet) -> Option<Signal> {
    let line = set.macd_line?;

    match (set.macd_signal, set.macd_histogram) {
        (Some(signal), Some(histogram)) => {
            if line > signal && histogram > 0.0 {
                Some(Signal::new("MACD", 1, "Bullish momentum building"))
            } else if line < signal && histogram < 0.0 {
                Some(Signal::new("MACD", -1, "Bearish momentum, fading"))
            } else {
                Some(Signal::neutral("MACD", "MACD at its signal line"))
            }
        }
        // Signal line not formed yet; score the line against zero.
        _ => {
            if line > 0.0 {
                Some(Signal::new("MACD", 1, "MACD line above zero"))
            } else if line < 0.0 {
                Some(Signal::new("MACD", -1, "MACD line below zero"))
            } else {
                Some(Signal::neutral("MACD", "MACD line flat"))
            }
        }
    }
}

fn bollinger_signal(set: &IndicatorSet, price: f64) -> Option<Signal> {
    let bands = set.bollinger?;
    if bands.width() <= 0.0 {
        log::debug!("Skipping Bollinger signal: zero-width bands");
        return None;
    }

    if price <= bands.lower {
        Some(Signal::new("Bollinger", 1, "Oversold - bounce candidate"))
    } else if price >= bands.upper {
        Some(Signal::new("Bollinger", -1, "Overbought - pullback possible"))
    } else {
        None
    }
}
