//! Fundamentals CSV adapter.
//!
//! Columns: `Symbol, debt_to_equity, interest_coverage, promoter_pledge_pct,
//! qoq_rev_pos_last3, qoq_eps_pos_last3`. Missing columns and blank or
//! non-numeric cells become `None`. Unreadable rows are skipped, leaving that
//! symbol without a record. The file is read once at construction.

use crate::adapters::csv_adapter::{HeaderIndex, reader_for};
use crate::domain::error::ScreenerError;
use crate::domain::hygiene::FundamentalsRecord;
use crate::domain::universe::normalize_symbol;
use crate::ports::fundamentals_port::FundamentalsPort;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default)]
pub struct CsvFundamentalsAdapter {
    records: HashMap<String, FundamentalsRecord>,
}

impl CsvFundamentalsAdapter {
    /// A missing file is not an error: every symbol's hygiene is UNKNOWN.
    pub fn load(path: &Path) -> Result<Self, ScreenerError> {
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "fundamentals file not found, hygiene will be UNKNOWN");
            return Ok(Self::default());
        }

        let mut rdr = reader_for(path)?;
        let headers = HeaderIndex::new(rdr.headers()?);
        if headers.position("Symbol").is_none() {
            return Err(ScreenerError::Data {
                reason: format!("fundamentals file {} has no Symbol column", path.display()),
            });
        }

        let mut records = HashMap::new();
        let mut skipped = 0usize;
        for result in rdr.records() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable fundamentals row");
                    skipped += 1;
                    continue;
                }
            };
            let Some(symbol) = headers.cell(&row, "Symbol").map(normalize_symbol) else {
                continue;
            };
            let record = FundamentalsRecord {
                symbol: symbol.clone(),
                debt_to_equity: headers.number(&row, "debt_to_equity"),
                interest_coverage: headers.number(&row, "interest_coverage"),
                promoter_pledge_pct: headers.number(&row, "promoter_pledge_pct"),
                qoq_rev_pos_last3: headers.number(&row, "qoq_rev_pos_last3"),
                qoq_eps_pos_last3: headers.number(&row, "qoq_eps_pos_last3"),
            };
            records.entry(symbol).or_insert(record);
        }

        tracing::debug!(path = %path.display(), records = records.len(), skipped, "fundamentals loaded");
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FundamentalsPort for CsvFundamentalsAdapter {
    fn get_fundamentals(&self, symbol: &str) -> Result<Option<FundamentalsRecord>, ScreenerError> {
        Ok(self.records.get(&normalize_symbol(symbol)).cloned())
    }
}
