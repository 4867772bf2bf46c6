//! Price series provider port.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;

/// Read-only source of end-of-day bars.
///
/// `get_series` must return bars in ascending date order without duplicate
/// dates; a series that breaks this is screened as insufficient history.
pub trait PriceSeriesPort {
    /// Symbols with price data available.
    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError>;

    fn get_series(&self, symbol: &str) -> Result<Vec<OhlcvBar>, ScreenerError>;
}
