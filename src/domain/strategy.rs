//! V2.3 strategy parameters.
//!
//! Every lookback window and threshold used by the technical engine lives
//! here so it can be tuned from the `[strategy]` config section.

use serde::Serialize;

pub const STRATEGY_NAME: &str = "V2.3";

/// Floor on bars required before any verdict other than NEUTRAL.
pub const MIN_HISTORY_BARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyParams {
    pub min_history: usize,

    pub sma_fast: usize,
    pub sma_slow: usize,
    pub slope_window: usize,
    pub momentum_window: usize,
    pub momentum_scale_pct: f64,

    pub rsi_period: usize,
    pub rsi_band_low: f64,
    pub rsi_band_high: f64,
    pub rsi_rising_lookback: usize,
    pub atr_period: usize,

    pub reclaim_support_window: usize,
    pub reclaim_recent_window: usize,
    pub reclaim_require_green: bool,

    pub volume_lookback: usize,
    pub volume_thrust_multiplier: f64,
    pub five_day_short: usize,
    pub five_day_long: usize,
    pub five_day_thrust_ratio: f64,

    pub rs_lookback_days: usize,

    pub entry_buffer_pct: f64,
    pub stop_atr_multiplier: f64,
    pub stop_min_buffer_pct: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            min_history: MIN_HISTORY_BARS,
            sma_fast: 20,
            sma_slow: 50,
            slope_window: 10,
            momentum_window: 20,
            momentum_scale_pct: 10.0,
            rsi_period: 14,
            rsi_band_low: 20.0,
            rsi_band_high: 38.0,
            rsi_rising_lookback: 10,
            atr_period: 14,
            reclaim_support_window: 20,
            reclaim_recent_window: 10,
            reclaim_require_green: true,
            volume_lookback: 20,
            volume_thrust_multiplier: 1.8,
            five_day_short: 5,
            five_day_long: 50,
            five_day_thrust_ratio: 1.3,
            rs_lookback_days: 20,
            entry_buffer_pct: 0.1,
            stop_atr_multiplier: 1.0,
            stop_min_buffer_pct: 2.2,
        }
    }
}

impl StrategyParams {
    /// Bars needed so that every indicator the engine reads is out of warmup.
    /// Saturates, so oversized windows read as "never enough history".
    pub fn required_history(&self) -> usize {
        [
            self.min_history,
            self.sma_fast,
            self.sma_slow.saturating_add(self.slope_window),
            self.momentum_window.saturating_add(1),
            self.rsi_period.saturating_add(self.rsi_rising_lookback),
            self.atr_period,
            self.reclaim_support_window
                .saturating_add(self.reclaim_recent_window)
                .saturating_add(1),
            self.volume_lookback.saturating_add(1),
            self.five_day_short.max(self.five_day_long),
        ]
        .into_iter()
        .max()
        .unwrap_or(MIN_HISTORY_BARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_required_history_is_sixty() {
        assert_eq!(StrategyParams::default().required_history(), 60);
    }

    #[test]
    fn required_history_tracks_longest_window() {
        let params = StrategyParams {
            sma_slow: 100,
            ..StrategyParams::default()
        };
        assert_eq!(params.required_history(), 110);

        let params = StrategyParams {
            reclaim_support_window: 60,
            reclaim_recent_window: 20,
            ..StrategyParams::default()
        };
        assert_eq!(params.required_history(), 81);
    }

    #[test]
    fn oversized_windows_saturate() {
        let params = StrategyParams {
            sma_slow: usize::MAX,
            reclaim_support_window: usize::MAX - 1,
            ..StrategyParams::default()
        };
        assert_eq!(params.required_history(), usize::MAX);
    }

    #[test]
    fn default_band_is_ordered() {
        let params = StrategyParams::default();
        assert!(params.rsi_band_low < params.rsi_band_high);
        assert_eq!(STRATEGY_NAME, "V2.3");
    }
}
