//! Watchlist CSV report: one row per ranked candidate.

use crate::domain::error::ScreenerError;
use crate::domain::ranker::Candidate;
use crate::domain::screen::ScreenReport;
use crate::ports::report_port::ReportPort;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct WatchlistRow<'a> {
    rank: usize,
    symbol: &'a str,
    signal: String,
    strength: String,
    close: Option<String>,
    atr_pct: Option<String>,
    rsi: Option<String>,
    reclaim: Option<bool>,
    volume_thrust: Option<bool>,
    rs_20d_high: Option<bool>,
    hygiene: String,
    failing_checks: String,
    entry: Option<String>,
    stop: Option<String>,
    notes: String,
}

fn fixed(value: f64, places: usize) -> String {
    format!("{value:.places$}")
}

impl<'a> From<&'a Candidate> for WatchlistRow<'a> {
    fn from(c: &'a Candidate) -> Self {
        let indicators = c.verdict.indicators.as_ref();
        let setup = c.verdict.setup.as_ref();
        let levels = c.verdict.levels.as_ref();
        Self {
            rank: c.rank,
            symbol: &c.symbol,
            signal: c.verdict.signal.to_string(),
            strength: fixed(c.verdict.strength, 4),
            close: indicators.map(|i| fixed(i.close, 2)),
            atr_pct: indicators.and_then(|i| i.atr_pct).map(|v| fixed(v, 2)),
            rsi: indicators.and_then(|i| i.rsi).map(|v| fixed(v, 1)),
            reclaim: setup.map(|s| s.reclaim),
            volume_thrust: setup.map(|s| s.volume_ok()),
            rs_20d_high: setup.and_then(|s| s.rs_20d_high),
            hygiene: c.hygiene.outcome.to_string(),
            failing_checks: c.hygiene.failing_names().join(";"),
            entry: levels.map(|l| fixed(l.entry, 2)),
            stop: levels.map(|l| fixed(l.stop, 2)),
            notes: c.verdict.notes.join("; "),
        }
    }
}

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn render(&self, report: &ScreenReport) -> Result<String, ScreenerError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        if report.candidates.is_empty() {
            // Header only, so an empty watchlist is still a valid CSV.
            wtr.write_record([
                "rank",
                "symbol",
                "signal",
                "strength",
                "close",
                "atr_pct",
                "rsi",
                "reclaim",
                "volume_thrust",
                "rs_20d_high",
                "hygiene",
                "failing_checks",
                "entry",
                "stop",
                "notes",
            ])?;
        }
        for candidate in &report.candidates {
            wtr.serialize(WatchlistRow::from(candidate))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| ScreenerError::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| ScreenerError::Data {
            reason: format!("watchlist is not valid UTF-8: {e}"),
        })
    }
}
