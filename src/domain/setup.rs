//! V2.3 setup checks: false-breakdown reclaim, volume thrust, rising RSI band
//! and relative strength at a 20-day high.
//!
//! Each check looks only at the latest bar and returns `false` when the data
//! is too short or a denominator is zero.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator::sma::calculate_volume_sma;
use crate::domain::ohlcv::OhlcvBar;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SetupChecks {
    pub reclaim: bool,
    pub volume_thrust: bool,
    pub five_day_thrust: bool,
    pub rising_rsi_band: bool,
    /// `None` when no benchmark index was supplied.
    pub rs_20d_high: Option<bool>,
}

impl SetupChecks {
    pub fn volume_ok(&self) -> bool {
        self.volume_thrust || self.five_day_thrust
    }

    /// Full V2.3 entry: reclaim with volume, RSI turning up inside the band,
    /// and relative strength at a high when a benchmark is available.
    pub fn triggered(&self) -> bool {
        self.reclaim && self.volume_ok() && self.rising_rsi_band && self.rs_20d_high.unwrap_or(true)
    }

    /// Share of evaluated checks that passed. The two volume flavours count as
    /// one check.
    pub fn passed_fraction(&self) -> f64 {
        let mut checks = vec![self.reclaim, self.volume_ok(), self.rising_rsi_band];
        if let Some(rs) = self.rs_20d_high {
            checks.push(rs);
        }
        let passed = checks.iter().filter(|&&c| c).count();
        passed as f64 / checks.len() as f64
    }

    pub fn notes(&self, band_low: f64, band_high: f64) -> Vec<String> {
        let mut notes = Vec::new();
        if self.volume_thrust {
            notes.push("VolThrust".to_string());
        }
        if self.five_day_thrust {
            notes.push("5DThrust".to_string());
        }
        if self.rising_rsi_band {
            notes.push(format!("RSI rising ({band_low}-{band_high})"));
        }
        if self.rs_20d_high == Some(true) {
            notes.push("RS 20D High".to_string());
        }
        if self.reclaim {
            notes.push("Reclaim".to_string());
        }
        notes
    }
}

/// Close dipped below prior support within the recent window and today closes
/// back above it. Support for bar i is the lowest close of the
/// `support_window` bars before i.
pub fn is_reclaim_setup(
    bars: &[OhlcvBar],
    support_window: usize,
    recent_window: usize,
    require_green: bool,
) -> bool {
    let n = bars.len();
    let needed = support_window.saturating_add(recent_window).saturating_add(1);
    if support_window == 0 || recent_window == 0 || n < needed {
        return false;
    }

    let prior_support = |i: usize| -> f64 {
        bars[i - support_window..i]
            .iter()
            .map(|b| b.close)
            .fold(f64::INFINITY, f64::min)
    };

    let today = n - 1;
    let breakdown = (today - recent_window..today).any(|j| bars[j].close < prior_support(j));
    let reclaimed = bars[today].close > prior_support(today);
    let green = !require_green || bars[today].is_green();

    breakdown && reclaimed && green
}

/// Today's volume exceeds `multiple` x the mean of the previous `lookback` bars.
pub fn volume_thrust(bars: &[OhlcvBar], lookback: usize, multiple: f64) -> bool {
    let prior_avg = calculate_volume_sma(bars, lookback).nth_back(1);
    let (Some(last), Some(prior_avg)) = (bars.last(), prior_avg) else {
        return false;
    };
    prior_avg > 0.0 && last.volume > multiple * prior_avg
}

/// Mean volume of the last `short` bars against the last `long` bars.
pub fn five_day_thrust(bars: &[OhlcvBar], short: usize, long: usize, ratio_min: f64) -> bool {
    let short_avg = calculate_volume_sma(bars, short).last();
    let long_avg = calculate_volume_sma(bars, long).last();
    match (short_avg, long_avg) {
        (Some(short_avg), Some(long_avg)) if long_avg > 0.0 => short_avg / long_avg >= ratio_min,
        _ => false,
    }
}

/// RSI sits inside `[low, high]` and is turning up: at or above the median of
/// its last `lookback` values and above their minimum.
pub fn rising_rsi_band(rsi: &IndicatorSeries, low: f64, high: f64, lookback: usize) -> bool {
    let Some(tail) = rsi.valid_tail(lookback) else {
        return false;
    };
    let Some(&last) = tail.last() else {
        return false;
    };

    let in_band = last >= low && last <= high;
    let min = tail.iter().copied().fold(f64::INFINITY, f64::min);
    let rising = last >= median(&tail) && last > min;
    in_band && rising
}

/// Relative strength line is at its highest over the last `window` points.
pub fn rs_at_high(rs: &IndicatorSeries, window: usize) -> bool {
    let Some(tail) = rs.valid_tail(window) else {
        return false;
    };
    let Some(&last) = tail.last() else {
        return false;
    };
    let max = tail.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    is_close(last, max)
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}
