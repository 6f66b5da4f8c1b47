// src/engine.rs
use crate::analysis::indicator_set::{compute_all, IndicatorSet};
use crate::analysis::outlook::{self, MarketOutlook};
use crate::config::{Config, RiskConfig};
use crate::domain::errors::{ConfigResult, MarketDataResult};
use crate::domain::models::{PriceSample, Recommendation, TradingPlan};
use crate::market_data::{PriceSnapshot, PriceWindow};
use crate::trading::history::RecommendationLog;
use crate::trading::plan;
use crate::trading::signals::SignalCombiner;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the presentation layer needs after one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub indicators: IndicatorSet,
    pub recommendation: Recommendation,
    pub plan: TradingPlan,
    pub outlook: MarketOutlook,
}

/// Owns the price window and the results of the latest analysis cycle.
///
/// Every accepted sample triggers a fresh cycle; reads never recompute.
pub struct SignalEngine {
    config: Config,
    window: PriceWindow,
    combiner: SignalCombiner,
    history: RecommendationLog,
    indicators: IndicatorSet,
    recommendation: Recommendation,
    outlook: MarketOutlook,
}

impl SignalEngine {
    pub fn new(config: Config) -> ConfigResult<Self> {
        config.validate()?;

        let window = PriceWindow::from_config(&config.window)?;
        let combiner = SignalCombiner::from_config(&config);
        let history = RecommendationLog::new(config.window.log_capacity);
        let (indicators, recommendation, outlook) = analyze(&window.snapshot(), &config, &combiner);

        Ok(Self {
            config,
            window,
            combiner,
            history,
            indicators,
            recommendation,
            outlook,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Feed one observation and refresh the analysis.
    pub fn on_new_price(
        &mut self,
        timestamp: DateTime<Utc>,
        price: f64,
        high: Option<f64>,
        low: Option<f64>,
        volume: Option<f64>,
    ) -> MarketDataResult<()> {
        self.push_sample(PriceSample {
            timestamp,
            price,
            high,
            low,
            volume,
        })
    }

    pub fn push_sample(&mut self, sample: PriceSample) -> MarketDataResult<()> {
        self.window.append(sample)?;
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        let (indicators, recommendation, outlook) =
            analyze(&self.window.snapshot(), &self.config, &self.combiner);

        if recommendation.label != self.recommendation.label {
            log::info!(
                "Recommendation changed: {} -> {} (score {}, confidence {:.0}%)",
                self.recommendation.label,
                recommendation.label,
                recommendation.score,
                recommendation.confidence
            );
        }

        self.history.push(&recommendation);
        self.indicators = indicators;
        self.recommendation = recommendation;
        self.outlook = outlook;
    }

    pub fn recommendation(&self) -> &Recommendation {
        &self.recommendation
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    pub fn outlook(&self) -> &MarketOutlook {
        &self.outlook
    }

    pub fn trading_plan(&self, risk: &RiskConfig) -> TradingPlan {
        plan::plan(
            self.recommendation.label,
            self.recommendation.price,
            self.indicators.support_levels(),
            self.indicators.resistance_levels(),
            self.indicators.atr,
            risk,
        )
    }

    /// Latest results bundled with a plan for the configured risk inputs.
    pub fn analysis(&self) -> Analysis {
        Analysis {
            indicators: self.indicators.clone(),
            recommendation: self.recommendation.clone(),
            plan: self.trading_plan(&self.config.risk),
            outlook: self.outlook.clone(),
        }
    }

    pub fn snapshot(&self) -> PriceSnapshot {
        self.window.snapshot()
    }

    pub fn history(&self) -> &RecommendationLog {
        &self.history
    }
}

fn analyze(
    snapshot: &PriceSnapshot,
    config: &Config,
    combiner: &SignalCombiner,
) -> (IndicatorSet, Recommendation, MarketOutlook) {
    let prices = snapshot.close_prices();
    let indicators = compute_all(snapshot, &config.indicators);

    let mut recommendation = combiner.evaluate(
        &indicators,
        snapshot.latest_price().unwrap_or(0.0),
        &prices,
    );
    recommendation.timestamp = snapshot.latest_timestamp();

    let outlook = outlook::assess(&prices, &indicators, &config.scoring);

    (indicators, recommendation, outlook)
}
