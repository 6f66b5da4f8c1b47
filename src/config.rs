// src/config.rs
use crate::domain::errors::{AppError, AppResult, ConfigError, ConfigResult};
use dotenv::dotenv;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// Signal engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Price window sizing and plausibility bounds
    pub window: WindowConfig,

    /// Indicator periods
    pub indicators: IndicatorConfig,

    /// Combiner thresholds and weights
    pub scoring: ScoringConfig,

    /// Trading plan risk inputs
    pub risk: RiskConfig,

    /// Feed runner settings
    pub feed: FeedConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Price window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Maximum retained samples
    pub capacity: usize,

    /// Lowest plausible spot price (inclusive)
    pub min_valid_price: f64,

    /// Highest plausible spot price (inclusive)
    pub max_valid_price: f64,

    /// Number of past recommendations kept for display
    pub log_capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            capacity: 200,
            min_valid_price: 1_000.0,
            max_valid_price: 1_000_000.0,
            log_capacity: 50,
        }
    }
}

/// Indicator periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub sma_short: usize,
    pub sma_long: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    pub support_resistance_lookback: usize,
    pub volatility_window: usize,
    pub atr_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_short: 10,
            sma_long: 30,
            ema_fast: 12,
            ema_slow: 26,
            macd_signal: 9,
            rsi_period: 14,
            bollinger_period: 20,
            bollinger_k: 2.0,
            support_resistance_lookback: 20,
            volatility_window: 10,
            atr_period: 14,
        }
    }
}

impl WindowConfig {
    /// Capacity and plausibility bounds a window can be built with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.capacity == 0 {
            return Err(ConfigError::invalid("window.capacity", "must be positive"));
        }
        if !(self.min_valid_price.is_finite() && self.min_valid_price > 0.0) {
            return Err(ConfigError::invalid(
                "window.min_valid_price",
                "must be finite and positive",
            ));
        }
        if !(self.max_valid_price.is_finite() && self.max_valid_price > self.min_valid_price) {
            return Err(ConfigError::invalid(
                "window.max_valid_price",
                "must be finite and above min_valid_price",
            ));
        }
        Ok(())
    }
}

impl IndicatorConfig {
    /// Samples needed before the combiner scores anything.
    pub fn required_history(&self) -> usize {
        self.sma_long.max(self.ema_slow).max(self.bollinger_period)
    }
}

/// Combiner thresholds and weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub rsi_oversold_weight: i32,
    pub rsi_overbought_weight: i32,

    /// RSI in `[rsi_oversold, rsi_buy_band)` adds `rsi_band_weight`
    pub rsi_buy_band: f64,

    /// RSI in `(rsi_sell_band, rsi_overbought]` subtracts `rsi_band_weight`
    pub rsi_sell_band: f64,
    pub rsi_band_weight: i32,

    pub momentum_window: usize,
    pub momentum_threshold_pct: f64,

    pub strong_buy_score: i32,
    pub buy_score: i32,
    pub sell_score: i32,
    pub strong_sell_score: i32,

    pub confidence_base: f64,
    pub confidence_per_point: f64,
    pub max_confidence: f64,
    pub insufficient_confidence: f64,

    pub volatility_medium_pct: f64,
    pub volatility_high_pct: f64,

    /// Score the fast EMA crossover next to the SMA trend rule
    pub ema_trend_confirmation: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            rsi_oversold_weight: 2,
            rsi_overbought_weight: 1,
            rsi_buy_band: 40.0,
            rsi_sell_band: 60.0,
            rsi_band_weight: 1,
            momentum_window: 5,
            momentum_threshold_pct: 1.0,
            strong_buy_score: 4,
            buy_score: 2,
            sell_score: -2,
            strong_sell_score: -4,
            confidence_base: 50.0,
            confidence_per_point: 10.0,
            max_confidence: 95.0,
            insufficient_confidence: 20.0,
            volatility_medium_pct: 3.0,
            volatility_high_pct: 7.0,
            ema_trend_confirmation: true,
        }
    }
}

/// Risk management configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Account balance in quote currency
    pub account_balance: Decimal,

    /// Percentage of the balance risked per trade
    pub risk_per_trade_pct: Decimal,

    /// Largest notional as a fraction of the balance
    pub max_position_fraction: Decimal,

    /// Fallback take-profit distance (percent) for buy-class plans
    pub take_profit_pct: f64,

    /// Fallback stop-loss distance (percent) for buy-class plans
    pub stop_loss_pct: f64,

    /// Fallback take-profit distance (percent) for sell-class plans
    pub sell_take_profit_pct: f64,

    /// Fallback stop-loss distance (percent) for sell-class plans
    pub sell_stop_loss_pct: f64,

    /// Symmetric band (percent) used for HOLD plans
    pub hold_band_pct: f64,

    /// Take-profit distance in ATRs when no level is available
    pub atr_take_profit_mult: f64,

    /// Stop-loss distance in ATRs when no level is available
    pub atr_stop_loss_mult: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            account_balance: Decimal::new(1000, 0),
            risk_per_trade_pct: Decimal::new(2, 0),
            max_position_fraction: Decimal::new(10, 2),
            take_profit_pct: 3.0,
            stop_loss_pct: 2.0,
            sell_take_profit_pct: 3.0,
            sell_stop_loss_pct: 2.0,
            hold_band_pct: 2.0,
            atr_take_profit_mult: 1.0,
            atr_stop_loss_mult: 0.8,
        }
    }
}

/// Feed runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub poll_interval_secs: u64,
    pub max_consecutive_errors: u32,
    pub synthetic_start_price: f64,
    pub synthetic_max_step_pct: f64,
    pub synthetic_seed: u64,
}

impl RiskConfig {
    /// Inputs a trading plan can be derived from
    pub fn validate(&self) -> ConfigResult<()> {
        if self.account_balance <= Decimal::ZERO {
            return Err(ConfigError::invalid("risk.account_balance", "must be positive"));
        }
        if self.risk_per_trade_pct <= Decimal::ZERO || self.risk_per_trade_pct > Decimal::ONE_HUNDRED {
            return Err(ConfigError::invalid(
                "risk.risk_per_trade_pct",
                "must be within (0, 100]",
            ));
        }
        if self.max_position_fraction <= Decimal::ZERO || self.max_position_fraction > Decimal::ONE {
            return Err(ConfigError::invalid(
                "risk.max_position_fraction",
                "must be within (0, 1]",
            ));
        }

        let pcts = [
            ("risk.take_profit_pct", self.take_profit_pct),
            ("risk.stop_loss_pct", self.stop_loss_pct),
            ("risk.sell_take_profit_pct", self.sell_take_profit_pct),
            ("risk.sell_stop_loss_pct", self.sell_stop_loss_pct),
            ("risk.hold_band_pct", self.hold_band_pct),
        ];
        for (field, pct) in pcts {
            if !(pct.is_finite() && pct > 0.0 && pct < 100.0) {
                return Err(ConfigError::invalid(field, "must be within (0, 100)"));
            }
        }

        let mults = [
            ("risk.atr_take_profit_mult", self.atr_take_profit_mult),
            ("risk.atr_stop_loss_mult", self.atr_stop_loss_mult),
        ];
        for (field, mult) in mults {
            if !(mult.is_finite() && mult > 0.0) {
                return Err(ConfigError::invalid(field, "must be finite and positive"));
            }
        }

        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            max_consecutive_errors: 10,
            synthetic_start_price: 60_000.0,
            synthetic_max_step_pct: 0.5,
            synthetic_seed: 42,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            to_file: false,
            file_path: None,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();

        let window = WindowConfig {
            capacity: env_or("WINDOW_CAPACITY", defaults.window.capacity),
            min_valid_price: env_or("MIN_VALID_PRICE", defaults.window.min_valid_price),
            max_valid_price: env_or("MAX_VALID_PRICE", defaults.window.max_valid_price),
            log_capacity: env_or("RECOMMENDATION_LOG_CAPACITY", defaults.window.log_capacity),
        };

        let indicators = IndicatorConfig {
            sma_short: env_or("SMA_SHORT", defaults.indicators.sma_short),
            sma_long: env_or("SMA_LONG", defaults.indicators.sma_long),
            ema_fast: env_or("EMA_FAST", defaults.indicators.ema_fast),
            ema_slow: env_or("EMA_SLOW", defaults.indicators.ema_slow),
            macd_signal: env_or("MACD_SIGNAL", defaults.indicators.macd_signal),
            rsi_period: env_or("RSI_PERIOD", defaults.indicators.rsi_period),
            bollinger_period: env_or("BOLLINGER_PERIOD", defaults.indicators.bollinger_period),
            bollinger_k: env_or("BOLLINGER_K", defaults.indicators.bollinger_k),
            ..defaults.indicators
        };

        let risk = RiskConfig {
            account_balance: env_or("ACCOUNT_BALANCE", defaults.risk.account_balance),
            risk_per_trade_pct: env_or("RISK_PER_TRADE_PCT", defaults.risk.risk_per_trade_pct),
            max_position_fraction: env_or(
                "MAX_POSITION_FRACTION",
                defaults.risk.max_position_fraction,
            ),
            ..defaults.risk
        };

        let feed = FeedConfig {
            poll_interval_secs: env_or("POLL_INTERVAL_SECS", defaults.feed.poll_interval_secs),
            synthetic_seed: env_or("SYNTHETIC_SEED", defaults.feed.synthetic_seed),
            ..defaults.feed
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env_or("LOG_TO_FILE", false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        let config = Config {
            window,
            indicators,
            scoring: defaults.scoring,
            risk,
            feed,
            logging,
        };
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Load(format!("Failed to read config file: {}", e))
        })?;

        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            ConfigError::Load(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        let w = &self.window;
        w.validate()?;

        let i = &self.indicators;
        let periods = [
            ("indicators.sma_short", i.sma_short),
            ("indicators.sma_long", i.sma_long),
            ("indicators.ema_fast", i.ema_fast),
            ("indicators.ema_slow", i.ema_slow),
            ("indicators.macd_signal", i.macd_signal),
            ("indicators.rsi_period", i.rsi_period),
            ("indicators.bollinger_period", i.bollinger_period),
            ("indicators.support_resistance_lookback", i.support_resistance_lookback),
            ("indicators.volatility_window", i.volatility_window),
            ("indicators.atr_period", i.atr_period),
        ];
        for (field, period) in periods {
            if period == 0 {
                return Err(ConfigError::invalid(field, "period must be positive"));
            }
        }
        if i.sma_short >= i.sma_long {
            return Err(ConfigError::invalid(
                "indicators.sma_short",
                format!("must be below sma_long ({})", i.sma_long),
            ));
        }
        if i.ema_fast >= i.ema_slow {
            return Err(ConfigError::invalid(
                "indicators.ema_fast",
                format!("must be below ema_slow ({})", i.ema_slow),
            ));
        }
        if !(i.bollinger_k.is_finite() && i.bollinger_k > 0.0) {
            return Err(ConfigError::invalid("indicators.bollinger_k", "must be positive"));
        }
        if w.capacity < i.required_history() {
            return Err(ConfigError::invalid(
                "window.capacity",
                format!("must hold at least {} samples", i.required_history()),
            ));
        }

        let s = &self.scoring;
        if !(0.0 < s.rsi_oversold
            && s.rsi_oversold <= s.rsi_buy_band
            && s.rsi_buy_band <= s.rsi_sell_band
            && s.rsi_sell_band <= s.rsi_overbought
            && s.rsi_overbought < 100.0)
        {
            return Err(ConfigError::invalid(
                "scoring.rsi_*",
                "RSI bands must satisfy 0 < oversold <= buy_band <= sell_band <= overbought < 100",
            ));
        }
        if s.momentum_window < 2 {
            return Err(ConfigError::invalid("scoring.momentum_window", "must be at least 2"));
        }
        if !(s.strong_sell_score < s.sell_score
            && s.sell_score < s.buy_score
            && s.buy_score < s.strong_buy_score)
        {
            return Err(ConfigError::invalid(
                "scoring.*_score",
                "thresholds must satisfy strong_sell < sell < buy < strong_buy",
            ));
        }
        if !(0.0..=100.0).contains(&s.max_confidence) {
            return Err(ConfigError::invalid("scoring.max_confidence", "must be within [0, 100]"));
        }
        if s.volatility_medium_pct >= s.volatility_high_pct {
            return Err(ConfigError::invalid(
                "scoring.volatility_medium_pct",
                "must be below volatility_high_pct",
            ));
        }

        self.risk.validate()?;

        if self.feed.poll_interval_secs == 0 {
            return Err(ConfigError::invalid("feed.poll_interval_secs", "must be positive"));
        }

        Ok(())
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        // Set log level
        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        // Configure output
        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    AppError::Config(ConfigError::Load(format!(
                        "Failed to create log file: {}",
                        e
                    )))
                })?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        builder.try_init().map_err(|e| {
            AppError::Config(ConfigError::Load(format!("Failed to initialize logger: {}", e)))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.indicators.required_history(), 30);
        assert_eq!(config.risk.max_position_fraction, dec!(0.10));
    }

    #[test]
    fn rejects_zero_period() {
        let mut config = Config::default();
        config.indicators.rsi_period = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "indicators.rsi_period", .. })
        ));
    }

    #[test]
    fn rejects_inverted_averages() {
        let mut config = Config::default();
        config.indicators.sma_short = 40;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.indicators.ema_fast = 26;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_price_bounds() {
        let mut config = Config::default();
        config.window.max_valid_price = 500.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_window_smaller_than_required_history() {
        let mut config = Config::default();
        config.window.capacity = 20;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "window.capacity", .. })
        ));
    }

    #[test]
    fn rejects_unordered_score_thresholds() {
        let mut config = Config::default();
        config.scoring.buy_score = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn risk_section_rejects_unusable_percentages() {
        let mut risk = RiskConfig::default();
        risk.take_profit_pct = -5.0;
        assert!(matches!(
            risk.validate(),
            Err(ConfigError::InvalidValue { field: "risk.take_profit_pct", .. })
        ));

        let mut risk = RiskConfig::default();
        risk.hold_band_pct = 150.0;
        assert!(risk.validate().is_err());

        let mut risk = RiskConfig::default();
        risk.atr_stop_loss_mult = f64::NAN;
        assert!(risk.validate().is_err());

        let mut risk = RiskConfig::default();
        risk.account_balance = dec!(0);
        assert!(risk.validate().is_err());
    }

    #[test]
    fn window_section_rejects_zero_capacity() {
        let window = WindowConfig {
            capacity: 0,
            ..WindowConfig::default()
        };
        assert!(matches!(
            window.validate(),
            Err(ConfigError::InvalidValue { field: "window.capacity", .. })
        ));
    }

    #[test]
    fn missing_sections_fields_fall_back_to_defaults() {
        let mut value = serde_json::to_value(Config::default()).expect("serialize");
        value["risk"]
            .as_object_mut()
            .expect("risk object")
            .remove("atr_stop_loss_mult");
        let config: Config = serde_json::from_value(value).expect("deserialize");
        assert_eq!(config.risk.atr_stop_loss_mult, 0.8);
    }

    #[test]
    fn rejects_oversized_position_fraction() {
        let mut config = Config::default();
        config.risk.max_position_fraction = dec!(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_round_trip_preserves_overrides() {
        let path = std::env::temp_dir().join(format!(
            "signal_engine_config_{}.json",
            std::process::id()
        ));
        let mut config = Config::default();
        config.window.capacity = 120;
        config.risk.account_balance = dec!(2500.50);
        config.to_file(&path).expect("write config");

        let loaded = Config::from_file(&path).expect("read config");
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn from_file_reports_parse_errors() {
        let path = std::env::temp_dir().join(format!(
            "signal_engine_bad_config_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").expect("write file");
        let result = Config::from_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(AppError::Config(ConfigError::Load(_)))));
    }
}
