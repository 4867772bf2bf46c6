//! ATR (Average True Range) as a simple rolling mean of true range.
//!
//! TR[0] = high - low; TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|)
//! ATR(n)[i] = mean(TR[i-n+1..=i])
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Atr(period),
            values: bars.iter().map(|b| IndicatorPoint::invalid(b.date)).collect(),
        };
    }

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i + 1 < period {
                IndicatorPoint::invalid(bar.date)
            } else {
                let window = &tr_values[i + 1 - period..=i];
                IndicatorPoint::valid(bar.date, window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}

/// ATR as a percentage of the latest close. `None` when close is zero or the
/// ATR is not yet valid.
pub fn atr_percent(atr: &IndicatorSeries, close: f64) -> Option<f64> {
    let value = atr.last()?;
    if close == 0.0 {
        return None;
    }
    let pct = value / close * 100.0;
    pct.is_finite().then_some(pct)
}
