//! Technical indicator implementations.
//!
//! Calculators return one [`IndicatorPoint`] per input bar (relative strength:
//! per date shared with the index). Points inside
//! the warmup window, or whose denominator is zero, are marked invalid rather
//! than carrying a NaN.

pub mod atr;
pub mod relative_strength;
pub mod roc;
pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn invalid(date: NaiveDate) -> Self {
        Self {
            date,
            valid: false,
            value: 0.0,
        }
    }

    pub fn valid(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            valid: true,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    VolumeSma(usize),
    Rsi(usize),
    Roc(usize),
    Atr(usize),
    RelativeStrength,
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Latest value, if the latest point is valid.
    pub fn last(&self) -> Option<f64> {
        self.values.last().filter(|p| p.valid).map(|p| p.value)
    }

    /// Value `back` points before the latest one, if valid.
    pub fn nth_back(&self, back: usize) -> Option<f64> {
        let idx = self.values.len().checked_sub(back + 1)?;
        let point = &self.values[idx];
        point.valid.then_some(point.value)
    }

    /// The last `n` values, only if all of them are valid.
    pub fn valid_tail(&self, n: usize) -> Option<Vec<f64>> {
        if n == 0 || self.values.len() < n {
            return None;
        }
        self.values[self.values.len() - n..]
            .iter()
            .map(|p| p.valid.then_some(p.value))
            .collect()
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|p| p.valid).count()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOLSMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Roc(period) => write!(f, "ROC({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::RelativeStrength => write!(f, "RS"),
        }
    }
}

#[cfg(test)]
pub(crate) fn bars_from_closes(prices: &[f64]) -> Vec<crate::domain::ohlcv::OhlcvBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| crate::domain::ohlcv::OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
            adj_close: None,
        })
        .collect()
}
