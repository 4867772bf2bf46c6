#![allow(dead_code)]

use chrono::NaiveDate;
use eodscreen::domain::error::ScreenerError;
use eodscreen::domain::hygiene::FundamentalsRecord;
pub use eodscreen::domain::ohlcv::OhlcvBar;
use eodscreen::domain::universe::UniverseEntry;
use eodscreen::ports::fundamentals_port::FundamentalsPort;
use eodscreen::ports::price_port::PriceSeriesPort;
use eodscreen::ports::universe_port::UniversePort;
use std::collections::BTreeMap;

pub struct MockPricePort {
    pub data: BTreeMap<String, Vec<OhlcvBar>>,
    pub errors: BTreeMap<String, String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    /// Listed as available, but fetching fails.
    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceSeriesPort for MockPricePort {
    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError> {
        let mut symbols: Vec<String> = self.data.keys().chain(self.errors.keys()).cloned().collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }

    fn get_series(&self, symbol: &str) -> Result<Vec<OhlcvBar>, ScreenerError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScreenerError::Data {
                reason: reason.clone(),
            });
        }
        self.data.get(symbol).cloned().ok_or_else(|| ScreenerError::Data {
            reason: format!("no series for {symbol}"),
        })
    }
}

pub struct MockUniversePort {
    pub entries: Vec<UniverseEntry>,
}

impl MockUniversePort {
    pub fn equities(symbols: &[&str]) -> Self {
        Self {
            entries: symbols.iter().map(|s| UniverseEntry::new(s, "EQ")).collect(),
        }
    }
}

impl UniversePort for MockUniversePort {
    fn list_universe(&self) -> Result<Vec<UniverseEntry>, ScreenerError> {
        Ok(self.entries.clone())
    }
}

#[derive(Default)]
pub struct MockFundamentalsPort {
    pub records: BTreeMap<String, FundamentalsRecord>,
    pub errors: BTreeMap<String, String>,
}

impl MockFundamentalsPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, record: FundamentalsRecord) -> Self {
        self.records.insert(record.symbol.clone(), record);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl FundamentalsPort for MockFundamentalsPort {
    fn get_fundamentals(&self, symbol: &str) -> Result<Option<FundamentalsRecord>, ScreenerError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScreenerError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.records.get(symbol).cloned())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(day: NaiveDate, close: f64, volume: f64) -> OhlcvBar {
    OhlcvBar {
        date: day,
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume,
        adj_close: None,
    }
}

/// `count` consecutive daily bars with closes `start, start + step, ...`.
pub fn trending_bars(count: usize, start: f64, step: f64) -> Vec<OhlcvBar> {
    let first = date(2023, 1, 2);
    (0..count)
        .map(|i| make_bar(first + chrono::Duration::days(i as i64), start + step * i as f64, 100_000.0))
        .collect()
}

pub fn flat_bars(count: usize, price: f64, volume: f64) -> Vec<OhlcvBar> {
    let first = date(2023, 1, 2);
    (0..count)
        .map(|i| OhlcvBar {
            date: first + chrono::Duration::days(i as i64),
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
            adj_close: None,
        })
        .collect()
}

pub fn clean_fundamentals(symbol: &str) -> FundamentalsRecord {
    FundamentalsRecord {
        symbol: symbol.to_string(),
        debt_to_equity: Some(0.3),
        interest_coverage: Some(12.0),
        promoter_pledge_pct: Some(0.0),
        qoq_rev_pos_last3: Some(3.0),
        qoq_eps_pos_last3: Some(2.0),
    }
}

pub fn leveraged_fundamentals(symbol: &str) -> FundamentalsRecord {
    FundamentalsRecord {
        debt_to_equity: Some(3.2),
        interest_coverage: Some(1.1),
        ..clean_fundamentals(symbol)
    }
}
