//! Simple moving averages over close and over volume.
//!
//! SMA(n)[i] = sum(X[i-j] for j in 0..n) / n
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values: rolling_mean(bars, period, |b| b.close),
    }
}

pub fn calculate_volume_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::VolumeSma(period),
        values: rolling_mean(bars, period, |b| b.volume),
    }
}

fn rolling_mean(bars: &[OhlcvBar], period: usize, field: impl Fn(&OhlcvBar) -> f64) -> Vec<IndicatorPoint> {
    let mut values = Vec::with_capacity(bars.len());
    if period == 0 {
        values.extend(bars.iter().map(|b| IndicatorPoint::invalid(b.date)));
        return values;
    }

    for (i, bar) in bars.iter().enumerate() {
        if i + 1 >= period {
            let window = &bars[i + 1 - period..=i];
            let sum: f64 = window.iter().map(&field).sum();
            values.push(IndicatorPoint::valid(bar.date, sum / period as f64));
        } else {
            values.push(IndicatorPoint::invalid(bar.date));
        }
    }
    values
}
