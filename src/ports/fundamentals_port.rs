//! Fundamentals provider port.

use crate::domain::error::ScreenerError;
use crate::domain::hygiene::FundamentalsRecord;

pub trait FundamentalsPort {
    /// `Ok(None)` when the provider has no record for `symbol`.
    fn get_fundamentals(&self, symbol: &str) -> Result<Option<FundamentalsRecord>, ScreenerError>;
}
