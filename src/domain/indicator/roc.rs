//! ROC (Rate of Change) indicator.
//!
//! ROC(n)[i] = ((C[i] - C[i-n]) / C[i-n]) * 100
//! If C[i-n] == 0: ROC = 0
//! Warmup: first n bars invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_roc(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        let date = bars[i].date;
        if period == 0 || i < period {
            values.push(IndicatorPoint::invalid(date));
            continue;
        }

        let prev_close = bars[i - period].close;
        let curr_close = bars[i].close;
        let value = if prev_close == 0.0 {
            0.0
        } else {
            ((curr_close - prev_close) / prev_close) * 100.0
        };
        values.push(IndicatorPoint::valid(date, value));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Roc(period),
        values,
    }
}
