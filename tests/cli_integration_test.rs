//! CLI integration tests.
//!
//! Tests cover:
//! - Config parsing into screen settings (build_screen_config, PathsConfig)
//! - Argument parsing for every subcommand
//! - `screen`, `universe`, `regime` and `validate` against INI and CSV files on disk
//! - Exit codes for invalid configuration and missing inputs

mod common;

use clap::Parser;
use common::*;
use eodscreen::adapters::file_config_adapter::FileConfigAdapter;
use eodscreen::cli::{self, Cli, Command, PathArgs, PathsConfig, ReportFormat};
use eodscreen::domain::error::ScreenerError;
use eodscreen::domain::hygiene::GrowthRule;
use eodscreen::domain::ranker::HygienePolicy;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn exit_report(code: ExitCode) -> String {
    format!("{code:?}")
}

fn assert_exit(code: ExitCode, expected: u8) {
    assert_eq!(exit_report(code), exit_report(ExitCode::from(expected)));
}

const VALID_INI: &str = r#"
[universe]
series_marker = EQ

[strategy]
volume_thrust_multiplier = 2.0
five_day_thrust_ratio = 1.5
stop_min_buffer_pct = 3.0

[hygiene]
debt_to_equity_max = 1.0
growth_rule = either

[ranking]
hygiene_policy = exclude_fail
max_candidates = 5

[regime]
pct_above_50dma_for_on = 50
"#;

fn write_series(dir: &Path, symbol: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.close, b.volume
        ));
    }
    fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}

/// A data root with universe, fundamentals, price files and a config pointing at them.
fn data_root(extra_ini: &str) -> (TempDir, PathBuf) {
    let root = TempDir::new().unwrap();
    let eod = root.path().join("eod");
    fs::create_dir_all(&eod).unwrap();
    write_series(&eod, "INFY", &trending_bars(260, 1400.0, 2.0));
    write_series(&eod, "WIPRO", &trending_bars(260, 600.0, -1.0));
    write_series(&eod, "NIFTY50", &trending_bars(260, 20_000.0, 10.0));

    fs::write(
        root.path().join("universe.csv"),
        "Company Name,Industry,Symbol,Series,ISIN Code\n\
         Infosys,IT,INFY,EQ,INE009A01021\n\
         Wipro,IT,WIPRO,EQ,INE075A01022\n",
    )
    .unwrap();
    fs::write(
        root.path().join("fundamentals.csv"),
        "Symbol,debt_to_equity,interest_coverage,promoter_pledge_pct,qoq_rev_pos_last3,qoq_eps_pos_last3\n\
         INFY,0.1,50,0,2,1\n",
    )
    .unwrap();

    let ini = format!(
        "[paths]\nuniverse_csv = {}\ndata_dir = {}\nfundamentals_csv = {}\nindex_symbol = NIFTY50\n{}",
        root.path().join("universe.csv").display(),
        eod.display(),
        root.path().join("fundamentals.csv").display(),
        extra_ini
    );
    let config = root.path().join("screen.ini");
    fs::write(&config, ini).unwrap();
    (root, config)
}

mod config_building {
    use super::*;

    #[test]
    fn valid_ini_builds_screen_config() {
        let file = write_temp_ini(VALID_INI);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let config = cli::build_screen_config(&adapter, None).unwrap();

        assert_eq!(config.series_marker, "EQ");
        assert_eq!(config.strategy.volume_thrust_multiplier, 2.0);
        assert_eq!(config.strategy.five_day_thrust_ratio, 1.5);
        assert_eq!(config.strategy.stop_min_buffer_pct, 3.0);
        assert_eq!(config.strategy.rsi_period, 14);
        assert_eq!(config.hygiene.debt_to_equity_max, 1.0);
        assert_eq!(config.hygiene.growth_rule, GrowthRule::Either);
        assert_eq!(config.ranking.hygiene_policy, HygienePolicy::ExcludeFail);
        assert_eq!(config.ranking.max_candidates, 5);
        assert_eq!(config.pct_above_50dma_for_on, 50.0);
        assert_eq!(config.symbols, None);
    }

    #[test]
    fn missing_paths_fall_back_to_defaults() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let paths = PathsConfig::resolve(&adapter, &PathArgs::default());
        assert_eq!(paths.universe_csv, PathBuf::from(cli::DEFAULT_UNIVERSE_CSV));
        assert_eq!(paths.data_dir, PathBuf::from(cli::DEFAULT_DATA_DIR));
        assert_eq!(paths.index_symbol.as_deref(), Some(cli::DEFAULT_INDEX_SYMBOL));
        assert_eq!(paths.output, None);
    }

    #[test]
    fn unreadable_config_is_parse_error() {
        let err = cli::load_config(Some(Path::new("/nonexistent/screen.ini"))).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigParse { .. }));
    }
}

mod argument_parsing {
    use super::*;

    #[test]
    fn screen_arguments() {
        let cli = Cli::parse_from([
            "eodscreen",
            "screen",
            "--config",
            "screen.ini",
            "--format",
            "json",
            "--symbols",
            "INFY,TCS",
            "--no-index",
            "-o",
            "out.json",
        ]);
        match cli.command {
            Command::Screen {
                paths,
                output,
                format,
                symbols,
            } => {
                assert_eq!(paths.config, Some(PathBuf::from("screen.ini")));
                assert!(paths.no_index);
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert_eq!(format, ReportFormat::Json);
                assert_eq!(symbols.as_deref(), Some("INFY,TCS"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn screen_defaults_to_csv() {
        let cli = Cli::parse_from(["eodscreen", "screen"]);
        assert!(matches!(
            cli.command,
            Command::Screen {
                format: ReportFormat::Csv,
                ..
            }
        ));
    }

    #[test]
    fn universe_prefix_argument() {
        let cli = Cli::parse_from(["eodscreen", "universe", "--prefix", "NSE"]);
        assert!(matches!(cli.command, Command::Universe { prefix: Some(ref p), .. } if p == "NSE"));
    }

    #[test]
    fn validate_requires_config() {
        assert!(Cli::try_parse_from(["eodscreen", "validate"]).is_err());
    }
}

mod commands {
    use super::*;

    #[test]
    fn screen_writes_watchlist() {
        let (root, config) = data_root("");
        let output = root.path().join("out").join("watchlist.csv");
        let code = cli::run(Cli::parse_from([
            "eodscreen",
            "screen",
            "--config",
            config.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ]));
        assert_exit(code, 0);

        let csv = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("1,INFY,BUY,"));
        assert!(lines[1].contains(",PASS,"));
    }

    #[test]
    fn screen_json_with_symbol_subset() {
        let (root, config) = data_root("");
        let output = root.path().join("report.json");
        let code = cli::run(Cli::parse_from([
            "eodscreen",
            "screen",
            "--config",
            config.to_str().unwrap(),
            "--format",
            "json",
            "--symbols",
            "wipro",
            "--output",
            output.to_str().unwrap(),
        ]));
        assert_exit(code, 0);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["summary"]["eligible"], 1);
        assert_eq!(value["verdicts"]["WIPRO"]["signal"], "SELL");
        assert!(value["regime"].is_object());
        assert_eq!(value["candidates"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn invalid_config_exits_with_config_code() {
        let (root, config) = data_root("[hygiene]\npledge_pct_max = -1\n");
        let code = cli::run(Cli::parse_from([
            "eodscreen",
            "screen",
            "--config",
            config.to_str().unwrap(),
            "--output",
            root.path().join("w.csv").to_str().unwrap(),
        ]));
        assert_exit(code, 2);
        assert!(!root.path().join("w.csv").exists());
    }

    #[test]
    fn duplicate_symbols_exit_with_universe_code() {
        let (_root, config) = data_root("");
        let code = cli::run(Cli::parse_from([
            "eodscreen",
            "screen",
            "--config",
            config.to_str().unwrap(),
            "--symbols",
            "INFY,infy",
        ]));
        assert_exit(code, 4);
    }

    #[test]
    fn missing_universe_file_exits_with_config_code() {
        let (root, config) = data_root("");
        fs::remove_file(root.path().join("universe.csv")).unwrap();
        let code = cli::run(Cli::parse_from([
            "eodscreen",
            "universe",
            "--config",
            config.to_str().unwrap(),
        ]));
        assert_exit(code, 2);
    }

    #[test]
    fn universe_and_regime_succeed() {
        let (_root, config) = data_root("");
        let path = config.to_str().unwrap();
        assert_exit(
            cli::run(Cli::parse_from(["eodscreen", "universe", "-c", path, "--prefix", "NSE"])),
            0,
        );
        assert_exit(cli::run(Cli::parse_from(["eodscreen", "regime", "-c", path])), 0);
    }

    #[test]
    fn regime_without_index_file_is_data_error() {
        let (root, config) = data_root("");
        fs::remove_file(root.path().join("eod").join("NIFTY50.csv")).unwrap();
        let code = cli::run(Cli::parse_from([
            "eodscreen",
            "regime",
            "--config",
            config.to_str().unwrap(),
        ]));
        assert_exit(code, 3);
    }

    #[test]
    fn validate_accepts_good_config_and_rejects_bad() {
        let good = write_temp_ini(VALID_INI);
        assert_exit(
            cli::run(Cli::parse_from(["eodscreen", "validate", "-c", good.path().to_str().unwrap()])),
            0,
        );

        let bad = write_temp_ini("[strategy]\nrsi_band_low = 50\nrsi_band_high = 30\n");
        assert_exit(
            cli::run(Cli::parse_from(["eodscreen", "validate", "-c", bad.path().to_str().unwrap()])),
            2,
        );
    }
}
