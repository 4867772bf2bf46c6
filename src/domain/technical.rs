//! Technical signal engine for strategy V2.3.
//!
//! Turns one symbol's bar series into a [`TechnicalVerdict`]. The engine never
//! fails: short or malformed series come back NEUTRAL with
//! `insufficient_history`, and non-finite numbers come back NEUTRAL with
//! `anomaly`.
//!
//! Decision rule:
//! - trend = mean of sign(close - SMA fast), sign(SMA fast - SMA slow) and
//!   sign(SMA slow slope over `slope_window`)
//! - momentum = ROC(momentum_window) / momentum_scale_pct, clamped to [-1, 1]
//! - a full V2.3 setup (see [`crate::domain::setup`]) is a BUY
//! - otherwise trend > 0 and momentum > 0 is a BUY, both < 0 is a SELL
//! - strength = 0.4 |trend| + 0.3 |momentum| + 0.3 setup share (BUY only),
//!   floored at 0.5 for a full setup; NEUTRAL is always 0

use crate::domain::indicator::atr::{atr_percent, calculate_atr};
use crate::domain::indicator::relative_strength::calculate_relative_strength;
use crate::domain::indicator::roc::calculate_roc;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::{OhlcvBar, SeriesDefect, check_series};
use crate::domain::setup::{
    SetupChecks, five_day_thrust, is_reclaim_setup, rising_rsi_band, rs_at_high, volume_thrust,
};
use crate::domain::strategy::StrategyParams;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

const TREND_WEIGHT: f64 = 0.4;
const MOMENTUM_WEIGHT: f64 = 0.3;
const SETUP_WEIGHT: f64 = 0.3;
const TRIGGER_STRENGTH_FLOOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub rsi: Option<f64>,
    pub atr_pct: Option<f64>,
    pub trend: f64,
    pub momentum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeLevels {
    pub entry: f64,
    pub stop: f64,
    pub risk_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalVerdict {
    pub symbol: String,
    pub signal: Signal,
    pub strength: f64,
    pub computed_at: Option<NaiveDate>,
    pub bars: usize,
    pub insufficient_history: bool,
    pub anomaly: bool,
    pub indicators: Option<IndicatorSnapshot>,
    pub setup: Option<SetupChecks>,
    pub levels: Option<TradeLevels>,
    pub notes: Vec<String>,
}

impl TechnicalVerdict {
    fn neutral(symbol: &str, bars: &[OhlcvBar]) -> Self {
        Self {
            symbol: symbol.to_string(),
            signal: Signal::Neutral,
            strength: 0.0,
            computed_at: bars.last().map(|b| b.date),
            bars: bars.len(),
            insufficient_history: false,
            anomaly: false,
            indicators: None,
            setup: None,
            levels: None,
            notes: Vec::new(),
        }
    }

    pub fn insufficient(symbol: &str, bars: &[OhlcvBar], note: String) -> Self {
        Self {
            insufficient_history: true,
            notes: vec![note],
            ..Self::neutral(symbol, bars)
        }
    }

    pub fn anomalous(symbol: &str, bars: &[OhlcvBar], note: &str) -> Self {
        Self {
            anomaly: true,
            notes: vec![format!("anomaly: {note}")],
            ..Self::neutral(symbol, bars)
        }
    }
}

/// Evaluates one symbol. `index` is the benchmark series used for relative
/// strength; without it the RS check is skipped.
pub fn evaluate(
    symbol: &str,
    bars: &[OhlcvBar],
    index: Option<&[OhlcvBar]>,
    params: &StrategyParams,
) -> TechnicalVerdict {
    if let Err(defect) = check_series(bars) {
        let note = match defect {
            SeriesDefect::OutOfOrder { index } => format!("series out of order at bar {index}"),
            SeriesDefect::DuplicateDate { index } => format!("duplicate date at bar {index}"),
        };
        return TechnicalVerdict::insufficient(symbol, bars, note);
    }

    let required = params.required_history();
    if bars.len() < required {
        return TechnicalVerdict::insufficient(
            symbol,
            bars,
            format!("insufficient history: {} bars, need {}", bars.len(), required),
        );
    }

    if !bars.iter().all(OhlcvBar::is_finite) {
        return TechnicalVerdict::anomalous(symbol, bars, "non-finite price or volume");
    }

    let Some((trend, momentum)) = directional_scores(bars, params) else {
        return TechnicalVerdict::anomalous(symbol, bars, "indicator undefined after warmup");
    };
    if !trend.is_finite() || !momentum.is_finite() {
        return TechnicalVerdict::anomalous(symbol, bars, "non-finite trend or momentum");
    }

    let rsi = calculate_rsi(bars, params.rsi_period);
    let atr = calculate_atr(bars, params.atr_period);
    let rs_20d_high = index.map(|idx| {
        let rs = calculate_relative_strength(bars, idx);
        rs_at_high(&rs, params.rs_lookback_days)
    });

    let setup = SetupChecks {
        reclaim: is_reclaim_setup(
            bars,
            params.reclaim_support_window,
            params.reclaim_recent_window,
            params.reclaim_require_green,
        ),
        volume_thrust: volume_thrust(bars, params.volume_lookback, params.volume_thrust_multiplier),
        five_day_thrust: five_day_thrust(
            bars,
            params.five_day_short,
            params.five_day_long,
            params.five_day_thrust_ratio,
        ),
        rising_rsi_band: rising_rsi_band(
            &rsi,
            params.rsi_band_low,
            params.rsi_band_high,
            params.rsi_rising_lookback,
        ),
        rs_20d_high,
    };

    let (signal, strength) = decide(trend, momentum, &setup);

    let Some(last) = bars.last() else {
        return TechnicalVerdict::insufficient(symbol, bars, "empty series".to_string());
    };
    let atr_value = atr.last();
    let levels = match signal {
        Signal::Buy => trade_levels(last, atr_value, params),
        _ => None,
    };

    let mut notes = Vec::new();
    if signal != Signal::Neutral {
        if setup.triggered() {
            notes.push(format!("{} setup", crate::domain::strategy::STRATEGY_NAME));
        }
        if trend > 0.0 {
            notes.push("Trend up".to_string());
        } else if trend < 0.0 {
            notes.push("Trend down".to_string());
        }
        notes.extend(setup.notes(params.rsi_band_low, params.rsi_band_high));
    }

    TechnicalVerdict {
        symbol: symbol.to_string(),
        signal,
        strength,
        computed_at: Some(last.date),
        bars: bars.len(),
        insufficient_history: false,
        anomaly: false,
        indicators: Some(IndicatorSnapshot {
            close: last.close,
            rsi: rsi.last(),
            atr_pct: atr_percent(&atr, last.close),
            trend,
            momentum,
        }),
        setup: Some(setup),
        levels,
        notes,
    }
}

fn directional_scores(bars: &[OhlcvBar], params: &StrategyParams) -> Option<(f64, f64)> {
    let fast = calculate_sma(bars, params.sma_fast);
    let slow = calculate_sma(bars, params.sma_slow);
    let roc = calculate_roc(bars, params.momentum_window);

    let close = bars.last()?.close;
    let fast_now = fast.last()?;
    let slow_now = slow.last()?;
    let slow_before = slow.nth_back(params.slope_window)?;

    let trend = (direction(close, fast_now)
        + direction(fast_now, slow_now)
        + direction(slow_now, slow_before))
        / 3.0;

    if params.momentum_scale_pct <= 0.0 {
        return None;
    }
    let momentum = (roc.last()? / params.momentum_scale_pct).clamp(-1.0, 1.0);

    Some((trend, momentum))
}

/// +1 / -1 / 0 with a relative tolerance so rounding noise on a flat series
/// reads as no direction.
fn direction(a: f64, b: f64) -> f64 {
    let tolerance = 1e-9 * a.abs().max(b.abs());
    let diff = a - b;
    if diff > tolerance {
        1.0
    } else if diff < -tolerance {
        -1.0
    } else {
        0.0
    }
}

fn decide(trend: f64, momentum: f64, setup: &SetupChecks) -> (Signal, f64) {
    if setup.triggered() {
        let composite = TREND_WEIGHT * trend.max(0.0)
            + MOMENTUM_WEIGHT * momentum.max(0.0)
            + SETUP_WEIGHT * setup.passed_fraction();
        return (Signal::Buy, composite.max(TRIGGER_STRENGTH_FLOOR).clamp(0.0, 1.0));
    }

    if trend > 0.0 && momentum > 0.0 {
        let composite =
            TREND_WEIGHT * trend + MOMENTUM_WEIGHT * momentum + SETUP_WEIGHT * setup.passed_fraction();
        return (Signal::Buy, composite.clamp(0.0, 1.0));
    }

    if trend < 0.0 && momentum < 0.0 {
        let composite = TREND_WEIGHT * -trend + MOMENTUM_WEIGHT * -momentum;
        return (Signal::Sell, composite.clamp(0.0, 1.0));
    }

    (Signal::Neutral, 0.0)
}

/// Entry just above the last high; stop the wider of an ATR multiple and a
/// minimum percentage buffer below entry.
fn trade_levels(last: &OhlcvBar, atr: Option<f64>, params: &StrategyParams) -> Option<TradeLevels> {
    let entry = last.high * (1.0 + params.entry_buffer_pct / 100.0);
    if entry.is_nan() || entry <= 0.0 {
        return None;
    }
    let atr_buffer = atr.map(|a| a * params.stop_atr_multiplier).unwrap_or(0.0);
    let pct_buffer = entry * params.stop_min_buffer_pct / 100.0;
    let stop = entry - atr_buffer.max(pct_buffer);
    let risk_pct = (entry - stop) / entry * 100.0;
    (stop.is_finite() && risk_pct.is_finite()).then_some(TradeLevels {
        entry,
        stop,
        risk_pct,
    })
}
