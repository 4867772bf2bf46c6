//! CSV file price series adapter.
//!
//! One file per symbol at `<data_dir>/<SYMBOL>.csv`. Headers are matched
//! case-insensitively; `Adj Close` stands in for a missing `Close` column.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::universe::normalize_symbol;
use crate::ports::price_port::PriceSeriesPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d-%b-%Y", "%Y/%m/%d", "%d/%m/%Y"];

/// Column lookup by normalized header name.
pub(crate) struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn new(headers: &csv::StringRecord) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (Self::normalize(h), i))
            .collect();
        Self { columns }
    }

    fn normalize(name: &str) -> String {
        name.trim()
            .trim_start_matches('\u{feff}')
            .to_lowercase()
            .replace(['_', ' '], "")
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.columns.get(&Self::normalize(name)).copied()
    }

    pub(crate) fn cell<'r>(&self, record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        self.position(name)
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub(crate) fn number(&self, record: &csv::StringRecord, name: &str) -> Option<f64> {
        self.cell(record, name)
            .and_then(|s| s.replace(',', "").parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }
}

pub(crate) fn reader_for(path: &Path) -> Result<csv::Reader<fs::File>, ScreenerError> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| ScreenerError::Data {
            reason: format!("failed to open {}: {}", path.display(), e),
        })
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

pub struct CsvSeriesAdapter {
    base_path: PathBuf,
}

impl CsvSeriesAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", normalize_symbol(symbol)))
    }

    fn read_bars(&self, path: &Path) -> Result<Vec<OhlcvBar>, ScreenerError> {
        let mut rdr = reader_for(path)?;
        let headers = HeaderIndex::new(rdr.headers()?);

        if headers.position("date").is_none() {
            return Err(ScreenerError::Data {
                reason: format!("{} has no Date column", path.display()),
            });
        }
        let has_close = headers.position("close").is_some();
        if !has_close && headers.position("adj close").is_none() {
            return Err(ScreenerError::Data {
                reason: format!("{} has neither Close nor Adj Close", path.display()),
            });
        }

        let mut bars = Vec::new();
        let mut dropped = 0usize;
        for result in rdr.records() {
            let record = result?;
            let adj_close = headers.number(&record, "adj close");
            let close = if has_close {
                headers.number(&record, "close")
            } else {
                adj_close
            };

            let bar = headers
                .cell(&record, "date")
                .and_then(parse_date)
                .zip(close)
                .and_then(|(date, close)| {
                    Some(OhlcvBar {
                        date,
                        open: headers.number(&record, "open")?,
                        high: headers.number(&record, "high")?,
                        low: headers.number(&record, "low")?,
                        close,
                        volume: headers.number(&record, "volume")?,
                        adj_close,
                    })
                });

            match bar {
                Some(bar) => bars.push(bar),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::debug!(path = %path.display(), dropped, "dropped unusable rows");
        }

        // Stable sort keeps the first occurrence of a repeated date first.
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Ok(bars)
    }
}

impl PriceSeriesPort for CsvSeriesAdapter {
    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| ScreenerError::Data {
            reason: format!(
                "failed to read data directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if !is_csv {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                symbols.push(normalize_symbol(&stem.to_string_lossy()));
            }
        }

        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }

    fn get_series(&self, symbol: &str) -> Result<Vec<OhlcvBar>, ScreenerError> {
        let path = self.csv_path(symbol);
        if !path.is_file() {
            return Err(ScreenerError::Data {
                reason: format!("no price file for {} at {}", symbol, path.display()),
            });
        }
        self.read_bars(&path)
    }
}
