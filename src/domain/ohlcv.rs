//! OHLCV bar representation and series validation.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub adj_close: Option<f64>,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Why a series cannot be screened as supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesDefect {
    /// Date at `index` is not after the date before it.
    OutOfOrder { index: usize },
    /// Date at `index` repeats the date before it.
    DuplicateDate { index: usize },
}

/// Checks that dates are strictly increasing.
pub fn check_series(bars: &[OhlcvBar]) -> Result<(), SeriesDefect> {
    for (i, pair) in bars.windows(2).enumerate() {
        if pair[1].date == pair[0].date {
            return Err(SeriesDefect::DuplicateDate { index: i + 1 });
        }
        if pair[1].date < pair[0].date {
            return Err(SeriesDefect::OutOfOrder { index: i + 1 });
        }
    }
    Ok(())
}
