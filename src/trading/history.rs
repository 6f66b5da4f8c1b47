// src/trading/history.rs
use crate::domain::models::{Recommendation, RecommendationLabel};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: Option<DateTime<Utc>>,
    pub label: RecommendationLabel,
    pub score: i32,
    pub confidence: f64,
    pub price: Decimal,
}

/// Bounded, in-memory log of past recommendations (oldest evicted first).
#[derive(Debug, Clone)]
pub struct RecommendationLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl RecommendationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, recommendation: &Recommendation) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(LogEntry {
            timestamp: recommendation.timestamp,
            label: recommendation.label,
            score: recommendation.score,
            confidence: recommendation.confidence,
            price: Decimal::from_f64(recommendation.price)
                .map(|p| p.round_dp(2))
                .unwrap_or_default(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How often each label was issued across the retained entries.
    pub fn label_counts(&self) -> HashMap<RecommendationLabel, usize> {
        let mut counts = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.label).or_insert(0) += 1;
        }
        counts
    }
}
