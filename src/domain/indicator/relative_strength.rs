//! Relative strength line: symbol close divided by benchmark index close.
//!
//! Points exist only on dates both series share. A zero index close makes the
//! point invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::collections::HashMap;

pub fn calculate_relative_strength(bars: &[OhlcvBar], index: &[OhlcvBar]) -> IndicatorSeries {
    let index_close: HashMap<NaiveDate, f64> = index.iter().map(|b| (b.date, b.close)).collect();

    let values = bars
        .iter()
        .filter_map(|bar| {
            let idx = *index_close.get(&bar.date)?;
            if idx == 0.0 {
                return Some(IndicatorPoint::invalid(bar.date));
            }
            let ratio = bar.close / idx;
            Some(if ratio.is_finite() {
                IndicatorPoint::valid(bar.date, ratio)
            } else {
                IndicatorPoint::invalid(bar.date)
            })
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::RelativeStrength,
        values,
    }
}
