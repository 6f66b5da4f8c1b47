// src/domain/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One price observation fed into the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
}

impl PriceSample {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            price,
            high: None,
            low: None,
            volume: None,
        }
    }

    pub fn with_range(mut self, high: f64, low: f64) -> Self {
        self.high = Some(high);
        self.low = Some(low);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// Discrete recommendation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationLabel {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl RecommendationLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationLabel::StrongBuy => "STRONG BUY",
            RecommendationLabel::Buy => "BUY",
            RecommendationLabel::Hold => "HOLD",
            RecommendationLabel::Sell => "SELL",
            RecommendationLabel::StrongSell => "STRONG SELL",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, RecommendationLabel::StrongBuy | RecommendationLabel::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, RecommendationLabel::StrongSell | RecommendationLabel::Sell)
    }
}

impl fmt::Display for RecommendationLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction a single signal leans towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalBias {
    Bullish,
    Bearish,
    Neutral,
}

impl SignalBias {
    pub fn from_strength(strength: i32) -> Self {
        match strength {
            s if s > 0 => SignalBias::Bullish,
            s if s < 0 => SignalBias::Bearish,
            _ => SignalBias::Neutral,
        }
    }
}

/// A scored observation produced by the combiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub title: String,
    pub strength: i32,
    pub bias: SignalBias,
    pub reason: String,
}

impl Signal {
    pub fn new(title: &str, strength: i32, reason: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            strength,
            bias: SignalBias::from_strength(strength),
            reason: reason.into(),
        }
    }

    pub fn neutral(title: &str, reason: impl Into<String>) -> Self {
        Self::new(title, 0, reason)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub label: RecommendationLabel,
    pub score: i32,
    pub confidence: f64,
    pub signals: Vec<Signal>,
    pub price: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Recommendation {
    /// Reasons joined in scoring order, for display.
    pub fn reason_text(&self) -> String {
        self.signals
            .iter()
            .map(|s| s.reason.as_str())
            .collect::<Vec<_>>()
            .join(" • ")
    }
}

/// Expected holding period in minutes; `max_minutes` is open-ended when `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldTime {
    pub min_minutes: u32,
    pub max_minutes: Option<u32>,
}

impl fmt::Display for HoldTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.max_minutes {
            Some(max) => write!(f, "{}-{} min", self.min_minutes, max),
            None => write!(f, "{}+ min", self.min_minutes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TradingPlan {
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub risk_reward_ratio: f64,
    pub risk_amount: f64,
    pub position_size: f64,
    pub position_value: f64,
    pub hold_time: Option<HoldTime>,
}

impl TradingPlan {
    /// All-zero plan; callers treat it as "not actionable".
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn is_actionable(&self) -> bool {
        self.entry > 0.0 && self.position_size > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}
