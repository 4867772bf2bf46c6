//! Universe allow-list.
//!
//! Restricts the working symbol set to listings whose series field matches the
//! configured marker and that have price data available. Symbols outside the
//! allow-list are dropped quietly; only an empty listing is an error.

use crate::domain::error::ScreenerError;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Default listing series for ordinary equity shares.
pub const EQUITY_SERIES: &str = "EQ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniverseEntry {
    pub symbol: String,
    pub series: String,
    pub company_name: Option<String>,
    pub industry: Option<String>,
}

impl UniverseEntry {
    pub fn new(symbol: &str, series: &str) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            series: series.trim().to_string(),
            company_name: None,
            industry: None,
        }
    }

    pub fn has_series(&self, marker: &str) -> bool {
        self.series.trim().eq_ignore_ascii_case(marker.trim())
    }
}

/// The eligible symbols for one run, sorted and unique.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Universe {
    pub symbols: Vec<String>,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.symbols.len()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.binary_search_by(|s| s.as_str().cmp(symbol)).is_ok()
    }

    /// Narrows the universe to `subset`. Subset symbols outside the universe
    /// are ignored.
    pub fn restrict_to(&self, subset: &[String]) -> Universe {
        let wanted: HashSet<&str> = subset.iter().map(String::as_str).collect();
        Universe {
            symbols: self
                .symbols
                .iter()
                .filter(|s| wanted.contains(s.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Symbol list for charting watchlists, e.g. `NSE:RELIANCE`.
    pub fn with_prefix(&self, prefix: Option<&str>) -> Vec<String> {
        match prefix {
            Some(p) if !p.is_empty() => self.symbols.iter().map(|s| format!("{p}:{s}")).collect(),
            _ => self.symbols.clone(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Parses a comma separated symbol list such as `"reliance, TCS"`.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = normalize_symbol(trimmed);
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Intersects the listing with the symbols that have price data, keeping only
/// entries whose series equals `marker`.
pub fn restrict_universe(
    entries: &[UniverseEntry],
    available: &[String],
    marker: &str,
) -> Result<Universe, ScreenerError> {
    if entries.is_empty() {
        return Err(ScreenerError::configuration("universe listing is empty"));
    }

    let available: HashSet<String> = available.iter().map(|s| normalize_symbol(s)).collect();

    let symbols: BTreeSet<String> = entries
        .iter()
        .filter(|e| e.has_series(marker))
        .map(|e| normalize_symbol(&e.symbol))
        .filter(|s| !s.is_empty() && available.contains(s))
        .collect();

    tracing::debug!(
        listed = entries.len(),
        eligible = symbols.len(),
        marker,
        "universe restricted"
    );

    Ok(Universe {
        symbols: symbols.into_iter().collect(),
    })
}
