// src/trading/plan.rs
use crate::config::RiskConfig;
use crate::domain::models::{HoldTime, RecommendationLabel, TradingPlan};
use rust_decimal::prelude::ToPrimitive;

/// Position size derived from the risk budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSize {
    pub risk_amount: f64,
    pub risk_per_unit: f64,
    pub raw_units: f64,
    pub units: f64,
}

/// |take_profit - entry| / |entry - stop_loss|, or 0 when entry equals the stop.
pub fn risk_reward_ratio(entry: f64, take_profit: f64, stop_loss: f64) -> f64 {
    let potential_loss = (entry - stop_loss).abs();
    if potential_loss == 0.0 {
        return 0.0;
    }
    (take_profit - entry).abs() / potential_loss
}

/// Size a position so a stop-out loses `risk_pct` of the balance, capped so
/// the notional never exceeds `max_position_fraction` of the balance.
pub fn position_size(
    account_balance: f64,
    risk_pct: f64,
    entry: f64,
    stop_loss: f64,
    max_position_fraction: f64,
) -> PositionSize {
    let risk_amount = account_balance * risk_pct / 100.0;
    let risk_per_unit = (entry - stop_loss).abs();
    let raw_units = if risk_per_unit > 0.0 {
        risk_amount / risk_per_unit
    } else {
        0.0
    };

    let max_notional = account_balance * max_position_fraction;
    let units = if entry > 0.0 {
        raw_units.min(max_notional / entry)
    } else {
        0.0
    };

    PositionSize {
        risk_amount,
        risk_per_unit,
        raw_units,
        units,
    }
}

pub fn hold_time_for(label: RecommendationLabel) -> HoldTime {
    if label.is_buy() {
        HoldTime {
            min_minutes: 30,
            max_minutes: Some(60),
        }
    } else if label.is_sell() {
        HoldTime {
            min_minutes: 45,
            max_minutes: Some(90),
        }
    } else {
        HoldTime {
            min_minutes: 60,
            max_minutes: None,
        }
    }
}

/// Targets derived from the average true range: `(take_profit, stop_loss)`.
///
/// `None` unless both targets stay on the correct side of the entry and
/// above zero.
pub fn atr_targets(
    label: RecommendationLabel,
    entry: f64,
    atr: Option<f64>,
    risk: &RiskConfig,
) -> Option<(f64, f64)> {
    let atr = atr.filter(|a| a.is_finite() && *a > 0.0)?;
    let reward = atr * risk.atr_take_profit_mult;
    let stop = atr * risk.atr_stop_loss_mult;

    let (take_profit, stop_loss) = if label.is_buy() {
        (entry + reward, entry - stop)
    } else if label.is_sell() {
        (entry - reward, entry + stop)
    } else {
        return None;
    };

    (take_profit > 0.0 && stop_loss > 0.0).then_some((take_profit, stop_loss))
}

/// Build a trading plan for `label` at `current_price`.
///
/// Targets come from the nearest key levels, then ATR, then the fixed
/// percentages in `risk`. Invalid prices or risk inputs produce a zeroed
/// plan rather than an error.
pub fn plan(
    label: RecommendationLabel,
    current_price: f64,
    support: &[f64],
    resistance: &[f64],
    atr: Option<f64>,
    risk: &RiskConfig,
) -> TradingPlan {
    if !current_price.is_finite() || current_price <= 0.0 {
        log::warn!("No trading plan: invalid price {}", current_price);
        return TradingPlan::zeroed();
    }
    if let Err(e) = risk.validate() {
        log::warn!("No trading plan: {}", e);
        return TradingPlan::zeroed();
    }

    let balance = risk.account_balance.to_f64().unwrap_or(0.0);
    let risk_pct = risk.risk_per_trade_pct.to_f64().unwrap_or(0.0);
    let max_fraction = risk.max_position_fraction.to_f64().unwrap_or(0.0);

    let nearest_support = support
        .iter()
        .copied()
        .filter(|level| level.is_finite() && *level > 0.0 && *level < current_price)
        .reduce(f64::max);
    let nearest_resistance = resistance
        .iter()
        .copied()
        .filter(|level| level.is_finite() && *level > current_price)
        .reduce(f64::min);

    let entry = current_price;
    let by_atr = atr_targets(label, entry, atr, risk);
    let (take_profit, stop_loss) = if label.is_buy() {
        (
            nearest_resistance
                .or(by_atr.map(|(tp, _)| tp))
                .unwrap_or(entry * (1.0 + risk.take_profit_pct / 100.0)),
            nearest_support
                .or(by_atr.map(|(_, sl)| sl))
                .unwrap_or(entry * (1.0 - risk.stop_loss_pct / 100.0)),
        )
    } else if label.is_sell() {
        (
            nearest_support
                .or(by_atr.map(|(tp, _)| tp))
                .unwrap_or(entry * (1.0 - risk.sell_take_profit_pct / 100.0)),
            nearest_resistance
                .or(by_atr.map(|(_, sl)| sl))
                .unwrap_or(entry * (1.0 + risk.sell_stop_loss_pct / 100.0)),
        )
    } else {
        (
            entry * (1.0 + risk.hold_band_pct / 100.0),
            entry * (1.0 - risk.hold_band_pct / 100.0),
        )
    };

    let size = position_size(balance, risk_pct, entry, stop_loss, max_fraction);

    TradingPlan {
        entry,
        take_profit,
        stop_loss,
        risk_reward_ratio: risk_reward_ratio(entry, take_profit, stop_loss),
        risk_amount: size.risk_amount,
        position_size: size.units,
        position_value: size.units * entry,
        hold_time: Some(hold_time_for(label)),
    }
}
