//! One screening run.
//!
//! [`ScreenSnapshot`] holds every input for the run, loaded once from the
//! ports. [`run_screen`] is a pure function of the snapshot and the config:
//! the same inputs always produce the same [`ScreenReport`].

use crate::domain::error::ScreenerError;
use crate::domain::hygiene::{
    FundamentalsRecord, HygieneOutcome, HygieneResult, HygieneThresholds, evaluate_hygiene,
};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::ranker::{Candidate, RankingConfig, rank_candidates};
use crate::domain::regime::{DEFAULT_PCT_ABOVE_50DMA_FOR_ON, RegimeReading, market_regime};
use crate::domain::strategy::{STRATEGY_NAME, StrategyParams};
use crate::domain::technical::{Signal, TechnicalVerdict, evaluate};
use crate::domain::universe::{EQUITY_SERIES, Universe, UniverseEntry, restrict_universe};
use crate::ports::fundamentals_port::FundamentalsPort;
use crate::ports::price_port::PriceSeriesPort;
use crate::ports::universe_port::UniversePort;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenConfig {
    pub series_marker: String,
    pub strategy: StrategyParams,
    pub hygiene: HygieneThresholds,
    pub ranking: RankingConfig,
    pub pct_above_50dma_for_on: f64,
    /// Optional narrowing of the universe to these symbols.
    pub symbols: Option<Vec<String>>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            series_marker: EQUITY_SERIES.to_string(),
            strategy: StrategyParams::default(),
            hygiene: HygieneThresholds::default(),
            ranking: RankingConfig::default(),
            pct_above_50dma_for_on: DEFAULT_PCT_ABOVE_50DMA_FOR_ON,
            symbols: None,
        }
    }
}

/// Immutable inputs for one run.
#[derive(Debug, Clone, Default)]
pub struct ScreenSnapshot {
    pub universe: Vec<UniverseEntry>,
    pub series: BTreeMap<String, Vec<OhlcvBar>>,
    pub fundamentals: BTreeMap<String, FundamentalsRecord>,
    pub index: Option<Vec<OhlcvBar>>,
}

impl ScreenSnapshot {
    /// Loads everything one run needs. Series are fetched only for listings
    /// carrying `config.series_marker`, the same marker [`run_screen`] filters
    /// on. A failed fetch for a single symbol is logged and screened as an
    /// empty series.
    pub fn load(
        universe_port: &dyn UniversePort,
        price_port: &dyn PriceSeriesPort,
        fundamentals_port: &dyn FundamentalsPort,
        index_symbol: Option<&str>,
        config: &ScreenConfig,
    ) -> Result<Self, ScreenerError> {
        let universe = universe_port.list_universe()?;
        let available = price_port.list_symbols()?;
        let eligible = restrict_universe(&universe, &available, &config.series_marker)?;

        tracing::info!(
            listed = universe.len(),
            with_data = available.len(),
            eligible = eligible.count(),
            "loading snapshot"
        );

        let mut series = BTreeMap::new();
        let mut fundamentals = BTreeMap::new();
        for symbol in &eligible.symbols {
            let bars = price_port.get_series(symbol).unwrap_or_else(|e| {
                tracing::warn!(symbol = %symbol, error = %e, "series unreadable, screening as empty");
                Vec::new()
            });
            series.insert(symbol.clone(), bars);

            match fundamentals_port.get_fundamentals(symbol) {
                Ok(Some(record)) => {
                    fundamentals.insert(symbol.clone(), record);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "fundamentals unreadable, hygiene unknown");
                }
            }
        }

        let index = match index_symbol {
            Some(idx) => match price_port.get_series(idx) {
                Ok(bars) if !bars.is_empty() => Some(bars),
                Ok(_) => {
                    tracing::warn!(index = idx, "index series is empty; RS and regime skipped");
                    None
                }
                Err(e) => {
                    tracing::warn!(index = idx, error = %e, "index series unreadable; RS and regime skipped");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            universe,
            series,
            fundamentals,
            index,
        })
    }

    pub fn available_symbols(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonCandidate {
    pub symbol: String,
    pub signal: Signal,
    pub insufficient_history: bool,
    pub anomaly: bool,
    pub hygiene: HygieneOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ScreenSummary {
    pub eligible: usize,
    pub buy: usize,
    pub sell: usize,
    pub neutral: usize,
    pub insufficient_history: usize,
    pub anomalies: usize,
    pub hygiene_pass: usize,
    pub hygiene_fail: usize,
    pub hygiene_unknown: usize,
    pub candidates: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenReport {
    pub strategy: String,
    pub as_of: Option<NaiveDate>,
    pub summary: ScreenSummary,
    pub regime: Option<RegimeReading>,
    pub candidates: Vec<Candidate>,
    pub non_candidates: Vec<NonCandidate>,
    pub excluded_by_policy: Vec<String>,
    pub verdicts: BTreeMap<String, TechnicalVerdict>,
    pub hygiene: BTreeMap<String, HygieneResult>,
}

/// Resolves the eligible universe for a snapshot, applying the optional
/// symbol subset.
pub fn eligible_universe(
    snapshot: &ScreenSnapshot,
    config: &ScreenConfig,
) -> Result<Universe, ScreenerError> {
    let universe = restrict_universe(
        &snapshot.universe,
        &snapshot.available_symbols(),
        &config.series_marker,
    )?;
    Ok(match &config.symbols {
        Some(subset) => universe.restrict_to(subset),
        None => universe,
    })
}

pub fn run_screen(snapshot: &ScreenSnapshot, config: &ScreenConfig) -> Result<ScreenReport, ScreenerError> {
    let universe = eligible_universe(snapshot, config)?;
    let index = snapshot.index.as_deref();

    let verdicts: BTreeMap<String, TechnicalVerdict> = universe
        .symbols
        .par_iter()
        .map(|symbol| {
            let bars = snapshot.series.get(symbol).map(Vec::as_slice).unwrap_or(&[]);
            (symbol.clone(), evaluate(symbol, bars, index, &config.strategy))
        })
        .collect();

    let hygiene: BTreeMap<String, HygieneResult> = universe
        .symbols
        .par_iter()
        .map(|symbol| {
            let record = snapshot.fundamentals.get(symbol);
            (symbol.clone(), evaluate_hygiene(symbol, record, &config.hygiene))
        })
        .collect();

    let ranking = rank_candidates(&verdicts, &hygiene, &config.ranking);

    // Everything not ranked and not excluded by policy, including BUYs cut by
    // `max_candidates`.
    let ranked: BTreeSet<&str> = ranking.candidates.iter().map(|c| c.symbol.as_str()).collect();
    let excluded: BTreeSet<&str> = ranking.excluded_by_policy.iter().map(String::as_str).collect();
    let non_candidates: Vec<NonCandidate> = verdicts
        .values()
        .filter(|v| !ranked.contains(v.symbol.as_str()) && !excluded.contains(v.symbol.as_str()))
        .map(|v| NonCandidate {
            symbol: v.symbol.clone(),
            signal: v.signal,
            insufficient_history: v.insufficient_history,
            anomaly: v.anomaly,
            hygiene: hygiene
                .get(&v.symbol)
                .map(|h| h.outcome)
                .unwrap_or(HygieneOutcome::Unknown),
        })
        .collect();

    let regime = index.map(|idx| {
        let series = universe
            .symbols
            .iter()
            .filter_map(|s| snapshot.series.get(s).map(Vec::as_slice));
        market_regime(idx, series, config.pct_above_50dma_for_on)
    });

    let summary = summarize(&verdicts, &hygiene, ranking.candidates.len());
    let as_of = verdicts.values().filter_map(|v| v.computed_at).max();

    tracing::info!(
        eligible = summary.eligible,
        buy = summary.buy,
        candidates = summary.candidates,
        insufficient = summary.insufficient_history,
        anomalies = summary.anomalies,
        "screen complete"
    );

    Ok(ScreenReport {
        strategy: STRATEGY_NAME.to_string(),
        as_of,
        summary,
        regime,
        candidates: ranking.candidates,
        non_candidates,
        excluded_by_policy: ranking.excluded_by_policy,
        verdicts,
        hygiene,
    })
}

fn summarize(
    verdicts: &BTreeMap<String, TechnicalVerdict>,
    hygiene: &BTreeMap<String, HygieneResult>,
    candidates: usize,
) -> ScreenSummary {
    let mut summary = ScreenSummary {
        eligible: verdicts.len(),
        candidates,
        ..ScreenSummary::default()
    };
    for verdict in verdicts.values() {
        match verdict.signal {
            Signal::Buy => summary.buy += 1,
            Signal::Sell => summary.sell += 1,
            Signal::Neutral => summary.neutral += 1,
        }
        summary.insufficient_history += usize::from(verdict.insufficient_history);
        summary.anomalies += usize::from(verdict.anomaly);
    }
    for result in hygiene.values() {
        match result.outcome {
            HygieneOutcome::Pass => summary.hygiene_pass += 1,
            HygieneOutcome::Fail => summary.hygiene_fail += 1,
            HygieneOutcome::Unknown => summary.hygiene_unknown += 1,
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(count: usize, start: f64, step: f64) -> Vec<OhlcvBar> {
        let first = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        (0..count)
            .map(|i| {
                let close = start + step * i as f64;
                OhlcvBar {
                    date: first + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 5_000.0,
                    adj_close: None,
                }
            })
            .collect()
    }

    fn snapshot() -> ScreenSnapshot {
        ScreenSnapshot {
            universe: vec![
                UniverseEntry::new("UP", "EQ"),
                UniverseEntry::new("DOWN", "EQ"),
                UniverseEntry::new("OFF", "BE"),
            ],
            series: [
                ("UP".to_string(), bars(120, 100.0, 1.0)),
                ("DOWN".to_string(), bars(120, 400.0, -1.0)),
                ("OFF".to_string(), bars(120, 100.0, 1.0)),
            ]
            .into(),
            fundamentals: BTreeMap::new(),
            index: None,
        }
    }

    #[test]
    fn run_screen_covers_every_eligible_symbol() {
        let report = run_screen(&snapshot(), &ScreenConfig::default()).unwrap();

        assert_eq!(report.verdicts.keys().collect::<Vec<_>>(), vec!["DOWN", "UP"]);
        assert_eq!(report.hygiene.len(), 2);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].symbol, "UP");
        assert_eq!(report.non_candidates.len(), 1);
        assert_eq!(report.non_candidates[0].signal, Signal::Sell);
        assert_eq!(report.summary.hygiene_unknown, 2);
        assert!(report.regime.is_none());
        assert_eq!(report.strategy, "V2.3");
    }

    #[test]
    fn buys_past_the_cap_are_non_candidates() {
        let snap = ScreenSnapshot {
            universe: vec![UniverseEntry::new("A", "EQ"), UniverseEntry::new("B", "EQ")],
            series: [
                ("A".to_string(), bars(120, 100.0, 1.0)),
                ("B".to_string(), bars(120, 100.0, 1.0)),
            ]
            .into(),
            ..ScreenSnapshot::default()
        };
        let config = ScreenConfig {
            ranking: RankingConfig {
                max_candidates: 1,
                ..RankingConfig::default()
            },
            ..ScreenConfig::default()
        };
        let report = run_screen(&snap, &config).unwrap();

        assert_eq!(report.summary.buy, 2);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].symbol, "A");
        assert_eq!(report.non_candidates.len(), 1);
        assert_eq!(report.non_candidates[0].symbol, "B");
        assert_eq!(report.non_candidates[0].signal, Signal::Buy);
    }

    #[test]
    fn subset_narrows_universe() {
        let config = ScreenConfig {
            symbols: Some(vec!["DOWN".to_string(), "OFF".to_string()]),
            ..ScreenConfig::default()
        };
        let report = run_screen(&snapshot(), &config).unwrap();
        assert_eq!(report.verdicts.keys().collect::<Vec<_>>(), vec!["DOWN"]);
    }

    #[test]
    fn empty_universe_fails() {
        let snap = ScreenSnapshot {
            universe: Vec::new(),
            ..snapshot()
        };
        let err = run_screen(&snap, &ScreenConfig::default()).unwrap_err();
        assert!(matches!(err, ScreenerError::Configuration { .. }));
    }

    #[test]
    fn index_enables_regime() {
        let snap = ScreenSnapshot {
            index: Some(bars(250, 1000.0, 1.0)),
            ..snapshot()
        };
        let report = run_screen(&snap, &ScreenConfig::default()).unwrap();
        let regime = report.regime.unwrap();
        assert_eq!(regime.symbols_considered, 2);
        assert!(regime.index_above_200dma);
    }

    #[test]
    fn as_of_is_latest_bar() {
        let report = run_screen(&snapshot(), &ScreenConfig::default()).unwrap();
        assert_eq!(report.as_of, Some(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Duration::days(119)));
    }
}
