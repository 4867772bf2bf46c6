//! Market regime: a breadth gauge reported next to the candidate list.
//!
//! ON when the benchmark closes above its 200-day SMA and at least
//! `pct_above_50dma_for_on` percent of the universe closes above its own
//! 50-day SMA.

use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::{OhlcvBar, check_series};
use serde::Serialize;
use std::fmt;

pub const INDEX_TREND_WINDOW: usize = 200;
pub const BREADTH_WINDOW: usize = 50;
pub const DEFAULT_PCT_ABOVE_50DMA_FOR_ON: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegimeState {
    On,
    Off,
}

impl fmt::Display for RegimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegimeState::On => write!(f, "ON"),
            RegimeState::Off => write!(f, "OFF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeReading {
    pub state: RegimeState,
    pub index_above_200dma: bool,
    pub pct_above_50dma: f64,
    pub symbols_considered: usize,
}

pub fn market_regime<'a>(
    index: &[OhlcvBar],
    universe: impl IntoIterator<Item = &'a [OhlcvBar]>,
    pct_above_50dma_for_on: f64,
) -> RegimeReading {
    let index_above_200dma = closes_above_sma(index, INDEX_TREND_WINDOW).unwrap_or(false);

    let mut considered = 0usize;
    let mut above = 0usize;
    for bars in universe {
        if let Some(is_above) = closes_above_sma(bars, BREADTH_WINDOW) {
            considered += 1;
            if is_above {
                above += 1;
            }
        }
    }

    let pct_above_50dma = if considered > 0 {
        above as f64 / considered as f64 * 100.0
    } else {
        0.0
    };

    let state = if index_above_200dma && pct_above_50dma >= pct_above_50dma_for_on {
        RegimeState::On
    } else {
        RegimeState::Off
    };

    RegimeReading {
        state,
        index_above_200dma,
        pct_above_50dma,
        symbols_considered: considered,
    }
}

/// `None` when the series is too short, malformed or non-finite.
fn closes_above_sma(bars: &[OhlcvBar], window: usize) -> Option<bool> {
    if bars.len() < window || check_series(bars).is_err() {
        return None;
    }
    let close = bars.last()?.close;
    let sma = calculate_sma(bars, window).last()?;
    (close.is_finite() && sma.is_finite()).then_some(close > sma)
}
