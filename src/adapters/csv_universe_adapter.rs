//! Universe listing adapter for exchange equity list CSVs.
//!
//! Expects `Symbol` and `Series` columns; `Company Name` and `Industry` are
//! carried when present.

use crate::adapters::csv_adapter::{HeaderIndex, reader_for};
use crate::domain::error::ScreenerError;
use crate::domain::universe::UniverseEntry;
use crate::ports::universe_port::UniversePort;
use std::path::PathBuf;

pub struct CsvUniverseAdapter {
    path: PathBuf,
}

impl CsvUniverseAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl UniversePort for CsvUniverseAdapter {
    fn list_universe(&self) -> Result<Vec<UniverseEntry>, ScreenerError> {
        if !self.path.is_file() {
            return Err(ScreenerError::configuration(format!(
                "universe file not found: {}",
                self.path.display()
            )));
        }

        let mut rdr = reader_for(&self.path)?;
        let headers = HeaderIndex::new(rdr.headers()?);
        for required in ["Symbol", "Series"] {
            if headers.position(required).is_none() {
                return Err(ScreenerError::configuration(format!(
                    "universe file {} has no {} column",
                    self.path.display(),
                    required
                )));
            }
        }

        let mut entries = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let Some(symbol) = headers.cell(&record, "Symbol") else {
                continue;
            };
            let series = headers.cell(&record, "Series").unwrap_or_default();
            let mut entry = UniverseEntry::new(symbol, series);
            entry.company_name = headers.cell(&record, "Company Name").map(str::to_string);
            entry.industry = headers.cell(&record, "Industry").map(str::to_string);
            entries.push(entry);
        }

        tracing::debug!(path = %self.path.display(), rows = entries.len(), "universe listing read");
        Ok(entries)
    }
}
