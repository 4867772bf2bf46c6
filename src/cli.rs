//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvSeriesAdapter;
use crate::adapters::csv_fundamentals_adapter::CsvFundamentalsAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::csv_universe_adapter::CsvUniverseAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::config_validation::validate_screen_config;
use crate::domain::error::ScreenerError;
use crate::domain::hygiene::{GrowthRule, HygieneThresholds};
use crate::domain::ranker::{HygienePolicy, RankingConfig};
use crate::domain::regime::{DEFAULT_PCT_ABOVE_50DMA_FOR_ON, RegimeReading, market_regime};
use crate::domain::screen::{ScreenConfig, ScreenReport, ScreenSnapshot, eligible_universe, run_screen};
use crate::domain::strategy::{MIN_HISTORY_BARS, STRATEGY_NAME, StrategyParams};
use crate::domain::universe::{EQUITY_SERIES, parse_symbols, restrict_universe};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PriceSeriesPort;
use crate::ports::report_port::ReportPort;
use crate::ports::universe_port::UniversePort;

pub const DEFAULT_UNIVERSE_CSV: &str = "data/ind_nifty500list.csv";
pub const DEFAULT_DATA_DIR: &str = "cache/eod";
pub const DEFAULT_FUNDAMENTALS_CSV: &str = "data/fundamentals.csv";
pub const DEFAULT_INDEX_SYMBOL: &str = "NIFTY50";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Parser, Debug)]
#[command(name = "eodscreen", about = "End-of-day equity screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Input locations. Flags override the `[paths]` config section.
#[derive(Args, Debug, Clone, Default)]
pub struct PathArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub universe: Option<PathBuf>,
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub fundamentals: Option<PathBuf>,
    /// Benchmark symbol, read from the data directory like any other series
    #[arg(long)]
    pub index: Option<String>,
    /// Skip the benchmark: no relative strength check and no regime
    #[arg(long)]
    pub no_index: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen the universe and write the ranked watchlist
    Screen {
        #[command(flatten)]
        paths: PathArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
        format: ReportFormat,
        /// Comma-separated subset of the universe to screen
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Print the market regime
    Regime {
        #[command(flatten)]
        paths: PathArgs,
    },
    /// List eligible symbols
    Universe {
        #[command(flatten)]
        paths: PathArgs,
        /// Exchange prefix for charting watchlists, e.g. NSE gives NSE:RELIANCE
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Validate a configuration file and print the effective settings
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Screen {
            paths,
            output,
            format,
            symbols,
        } => run_screen_command(&paths, output.as_deref(), format, symbols.as_deref()),
        Command::Regime { paths } => run_regime(&paths),
        Command::Universe { paths, prefix } => run_universe(&paths, prefix.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, ScreenerError> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathsConfig {
    pub universe_csv: PathBuf,
    pub data_dir: PathBuf,
    pub fundamentals_csv: PathBuf,
    pub index_symbol: Option<String>,
    pub output: Option<PathBuf>,
}

impl PathsConfig {
    pub fn resolve(config: &dyn ConfigPort, args: &PathArgs) -> Self {
        let path = |key: &str, flag: &Option<PathBuf>, default: &str| {
            flag.clone()
                .or_else(|| config.get_string("paths", key).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(default))
        };

        let index_symbol = if args.no_index {
            None
        } else {
            let symbol = args
                .index
                .clone()
                .or_else(|| config.get_string("paths", "index_symbol"))
                .unwrap_or_else(|| DEFAULT_INDEX_SYMBOL.to_string());
            Some(symbol.trim().to_uppercase()).filter(|s| !s.is_empty())
        };

        Self {
            universe_csv: path("universe_csv", &args.universe, DEFAULT_UNIVERSE_CSV),
            data_dir: path("data_dir", &args.data_dir, DEFAULT_DATA_DIR),
            fundamentals_csv: path("fundamentals_csv", &args.fundamentals, DEFAULT_FUNDAMENTALS_CSV),
            index_symbol,
            output: config.get_string("paths", "output").map(PathBuf::from),
        }
    }
}

pub fn build_strategy_params(config: &dyn ConfigPort) -> StrategyParams {
    let d = StrategyParams::default();
    let s = "strategy";
    StrategyParams {
        min_history: config.get_usize(s, "min_history", MIN_HISTORY_BARS),
        sma_fast: config.get_usize(s, "sma_fast", d.sma_fast),
        sma_slow: config.get_usize(s, "sma_slow", d.sma_slow),
        slope_window: config.get_usize(s, "slope_window", d.slope_window),
        momentum_window: config.get_usize(s, "momentum_window", d.momentum_window),
        momentum_scale_pct: config.get_double(s, "momentum_scale_pct", d.momentum_scale_pct),
        rsi_period: config.get_usize(s, "rsi_period", d.rsi_period),
        rsi_band_low: config.get_double(s, "rsi_band_low", d.rsi_band_low),
        rsi_band_high: config.get_double(s, "rsi_band_high", d.rsi_band_high),
        rsi_rising_lookback: config.get_usize(s, "rsi_rising_lookback", d.rsi_rising_lookback),
        atr_period: config.get_usize(s, "atr_period", d.atr_period),
        reclaim_support_window: config.get_usize(s, "reclaim_support_window", d.reclaim_support_window),
        reclaim_recent_window: config.get_usize(s, "reclaim_recent_window", d.reclaim_recent_window),
        reclaim_require_green: config.get_bool(s, "reclaim_require_green", d.reclaim_require_green),
        volume_lookback: config.get_usize(s, "volume_lookback", d.volume_lookback),
        volume_thrust_multiplier: config.get_double(s, "volume_thrust_multiplier", d.volume_thrust_multiplier),
        five_day_short: config.get_usize(s, "five_day_short", d.five_day_short),
        five_day_long: config.get_usize(s, "five_day_long", d.five_day_long),
        five_day_thrust_ratio: config.get_double(s, "five_day_thrust_ratio", d.five_day_thrust_ratio),
        rs_lookback_days: config.get_usize(s, "rs_lookback_days", d.rs_lookback_days),
        entry_buffer_pct: config.get_double(s, "entry_buffer_pct", d.entry_buffer_pct),
        stop_atr_multiplier: config.get_double(s, "stop_atr_multiplier", d.stop_atr_multiplier),
        stop_min_buffer_pct: config.get_double(s, "stop_min_buffer_pct", d.stop_min_buffer_pct),
    }
}

pub fn build_hygiene_thresholds(config: &dyn ConfigPort) -> Result<HygieneThresholds, ScreenerError> {
    let d = HygieneThresholds::default();
    let h = "hygiene";
    let growth_rule = match config.get_string(h, "growth_rule") {
        Some(value) => GrowthRule::parse(&value).ok_or_else(|| {
            ScreenerError::invalid(h, "growth_rule", format!("unknown growth_rule '{value}'"))
        })?,
        None => d.growth_rule,
    };

    Ok(HygieneThresholds {
        debt_to_equity_max: config.get_double(h, "debt_to_equity_max", d.debt_to_equity_max),
        interest_coverage_min: config.get_double(h, "interest_coverage_min", d.interest_coverage_min),
        pledge_pct_max: config.get_double(h, "pledge_pct_max", d.pledge_pct_max),
        qoq_min_positive: config.get_double(h, "qoq_min_positive", d.qoq_min_positive),
        growth_rule,
        check_debt_to_equity: config.get_bool(h, "check_debt_to_equity", d.check_debt_to_equity),
        check_interest_coverage: config.get_bool(h, "check_interest_coverage", d.check_interest_coverage),
        check_pledge: config.get_bool(h, "check_pledge", d.check_pledge),
        check_qoq_revenue: config.get_bool(h, "check_qoq_revenue", d.check_qoq_revenue),
        check_qoq_eps: config.get_bool(h, "check_qoq_eps", d.check_qoq_eps),
    })
}

pub fn build_ranking_config(config: &dyn ConfigPort) -> Result<RankingConfig, ScreenerError> {
    let hygiene_policy = match config.get_string("ranking", "hygiene_policy") {
        Some(value) => HygienePolicy::parse(&value).ok_or_else(|| {
            ScreenerError::invalid("ranking", "hygiene_policy", format!("unknown hygiene_policy '{value}'"))
        })?,
        None => HygienePolicy::default(),
    };
    Ok(RankingConfig {
        hygiene_policy,
        max_candidates: config.get_usize("ranking", "max_candidates", 0),
    })
}

pub fn build_screen_config(
    config: &dyn ConfigPort,
    symbols: Option<&str>,
) -> Result<ScreenConfig, ScreenerError> {
    let symbols = symbols.map(parse_symbols).transpose()?;
    Ok(ScreenConfig {
        series_marker: config
            .get_string("universe", "series_marker")
            .unwrap_or_else(|| EQUITY_SERIES.to_string()),
        strategy: build_strategy_params(config),
        hygiene: build_hygiene_thresholds(config)?,
        ranking: build_ranking_config(config)?,
        pct_above_50dma_for_on: config.get_double(
            "regime",
            "pct_above_50dma_for_on",
            DEFAULT_PCT_ABOVE_50DMA_FOR_ON,
        ),
        symbols,
    })
}

fn load_validated(args: &PathArgs) -> Result<(FileConfigAdapter, PathsConfig), ScreenerError> {
    let config = load_config(args.config.as_deref())?;
    validate_screen_config(&config)?;
    let paths = PathsConfig::resolve(&config, args);
    Ok((config, paths))
}

fn load_snapshot(paths: &PathsConfig, screen_config: &ScreenConfig) -> Result<ScreenSnapshot, ScreenerError> {
    let universe = CsvUniverseAdapter::new(paths.universe_csv.clone());
    let prices = CsvSeriesAdapter::new(paths.data_dir.clone());
    let fundamentals = CsvFundamentalsAdapter::load(&paths.fundamentals_csv)?;
    ScreenSnapshot::load(
        &universe,
        &prices,
        &fundamentals,
        paths.index_symbol.as_deref(),
        screen_config,
    )
}

fn run_screen_command(
    args: &PathArgs,
    output: Option<&Path>,
    format: ReportFormat,
    symbols: Option<&str>,
) -> Result<(), ScreenerError> {
    let (config, paths) = load_validated(args)?;
    let screen_config = build_screen_config(&config, symbols)?;

    let snapshot = load_snapshot(&paths, &screen_config)?;
    if paths.index_symbol.is_some() && snapshot.index.is_none() {
        tracing::warn!(
            "place the index CSV in {} to enable relative strength and regime",
            paths.data_dir.display()
        );
    }

    let report = run_screen(&snapshot, &screen_config)?;
    print_summary(&report);

    let output = output
        .map(Path::to_path_buf)
        .or_else(|| paths.output.clone())
        .unwrap_or_else(|| default_output_path(&report, format));

    let writer: Box<dyn ReportPort> = match format {
        ReportFormat::Csv => Box::new(CsvReportAdapter),
        ReportFormat::Json => Box::new(JsonReportAdapter),
    };
    writer.write(&report, &output)?;
    tracing::info!(path = %output.display(), "report written");
    Ok(())
}

/// `output/watchlist_<YYYYMMDD>.<ext>`, dated by the latest bar screened.
pub fn default_output_path(report: &ScreenReport, format: ReportFormat) -> PathBuf {
    let stem = match report.as_of {
        Some(date) => format!("watchlist_{}", date.format("%Y%m%d")),
        None => "watchlist".to_string(),
    };
    Path::new(DEFAULT_OUTPUT_DIR).join(format!("{stem}.{}", format.extension()))
}

fn print_summary(report: &ScreenReport) {
    let s = &report.summary;
    let as_of = report
        .as_of
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("Strategy {} as of {}", report.strategy, as_of);
    println!(
        "Eligible: {}  BUY: {}  SELL: {}  NEUTRAL: {}  (insufficient history: {}, anomalies: {})",
        s.eligible, s.buy, s.sell, s.neutral, s.insufficient_history, s.anomalies
    );
    println!(
        "Hygiene: PASS {}  FAIL {}  UNKNOWN {}",
        s.hygiene_pass, s.hygiene_fail, s.hygiene_unknown
    );
    if let Some(regime) = &report.regime {
        print_regime(regime);
    }
    if !report.excluded_by_policy.is_empty() {
        println!("Excluded by hygiene policy: {}", report.excluded_by_policy.join(", "));
    }

    if report.candidates.is_empty() {
        println!("\nNo candidates.");
        return;
    }
    println!("\n{:>4}  {:<14} {:>8}  {:<8} {:>10} {:>10}  NOTES", "RANK", "SYMBOL", "STRENGTH", "HYGIENE", "ENTRY", "STOP");
    for c in &report.candidates {
        let (entry, stop) = c
            .verdict
            .levels
            .as_ref()
            .map(|l| (format!("{:.2}", l.entry), format!("{:.2}", l.stop)))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        println!(
            "{:>4}  {:<14} {:>8.3}  {:<8} {:>10} {:>10}  {}",
            c.rank,
            c.symbol,
            c.verdict.strength,
            c.hygiene.outcome.to_string(),
            entry,
            stop,
            c.verdict.notes.join("; ")
        );
    }
}

fn print_regime(regime: &RegimeReading) {
    println!(
        "Regime: {}  (index above 200DMA: {}, {:.1}% of {} symbols above 50DMA)",
        regime.state,
        if regime.index_above_200dma { "yes" } else { "no" },
        regime.pct_above_50dma,
        regime.symbols_considered
    );
}

fn run_regime(args: &PathArgs) -> Result<(), ScreenerError> {
    let (config, paths) = load_validated(args)?;
    let screen_config = build_screen_config(&config, None)?;
    let Some(index_symbol) = paths.index_symbol.as_deref() else {
        return Err(ScreenerError::configuration("regime needs an index symbol"));
    };

    let snapshot = load_snapshot(&paths, &screen_config)?;
    let Some(index) = snapshot.index.as_deref() else {
        return Err(ScreenerError::Data {
            reason: format!(
                "index series {} not found in {}",
                index_symbol,
                paths.data_dir.display()
            ),
        });
    };

    let universe = eligible_universe(&snapshot, &screen_config)?;
    let series = universe
        .symbols
        .iter()
        .filter_map(|s| snapshot.series.get(s).map(Vec::as_slice));
    let reading = market_regime(index, series, screen_config.pct_above_50dma_for_on);
    print_regime(&reading);
    Ok(())
}

fn run_universe(args: &PathArgs, prefix: Option<&str>) -> Result<(), ScreenerError> {
    let (config, paths) = load_validated(args)?;
    let marker = build_screen_config(&config, None)?.series_marker;

    let entries = CsvUniverseAdapter::new(paths.universe_csv.clone()).list_universe()?;
    let available = CsvSeriesAdapter::new(paths.data_dir.clone()).list_symbols()?;
    let universe = restrict_universe(&entries, &available, &marker)?;

    for line in universe.with_prefix(prefix) {
        println!("{line}");
    }
    tracing::info!(eligible = universe.count(), listed = entries.len(), "universe listed");
    Ok(())
}

#[derive(Serialize)]
struct EffectiveSettings<'a> {
    strategy_name: &'a str,
    paths: &'a PathsConfig,
    screen: &'a ScreenConfig,
}

fn run_validate(config_path: &Path) -> Result<(), ScreenerError> {
    let config = load_config(Some(config_path))?;
    validate_screen_config(&config)?;
    let screen = build_screen_config(&config, None)?;
    let paths = PathsConfig::resolve(&config, &PathArgs::default());

    let settings = EffectiveSettings {
        strategy_name: STRATEGY_NAME,
        paths: &paths,
        screen: &screen,
    };
    println!("{}", serde_json::to_string_pretty(&settings)?);
    eprintln!(
        "Configuration is valid (strategy {STRATEGY_NAME} needs {} bars of history).",
        screen.strategy.required_history()
    );
    Ok(())
}
