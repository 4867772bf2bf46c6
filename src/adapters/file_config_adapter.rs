//! INI file configuration adapter.

use crate::domain::error::ScreenerError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScreenerError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| ScreenerError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, ScreenerError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| ScreenerError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// An empty config; every getter returns its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const SCREEN_INI: &str = r#"
[paths]
universe_csv = data/EQUITY_L.csv
data_dir = data/eod
index_symbol = NIFTY50

[strategy]
rsi_period = 14
volume_thrust_multiplier = 1.8
reclaim_require_green = no

[hygiene]
debt_to_equity_max = 1.5
check_pledge = off

[ranking]
hygiene_policy = advisory
max_candidates = 20
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SCREEN_INI).unwrap();
        assert_eq!(
            adapter.get_string("paths", "universe_csv"),
            Some("data/EQUITY_L.csv".to_string())
        );
        assert_eq!(
            adapter.get_string("paths", "index_symbol"),
            Some("NIFTY50".to_string())
        );
        assert_eq!(adapter.get_int("strategy", "rsi_period", 0), 14);
        assert_eq!(adapter.get_double("strategy", "volume_thrust_multiplier", 0.0), 1.8);
        assert_eq!(adapter.get_usize("ranking", "max_candidates", 0), 20);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(SCREEN_INI).unwrap();
        assert_eq!(adapter.get_string("paths", "fundamentals_csv"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn numeric_getters_fall_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nrsi_period = abc\nsma_fast = -3\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "rsi_period", 14), 14);
        assert_eq!(adapter.get_int("strategy", "missing", 42), 42);
        assert_eq!(adapter.get_double("strategy", "rsi_period", 9.5), 9.5);
        assert_eq!(adapter.get_usize("strategy", "sma_fast", 20), 20);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[hygiene]\na = true\nb = yes\nc = on\nd = 0\ne = off\nf = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("hygiene", "a", false));
        assert!(adapter.get_bool("hygiene", "b", false));
        assert!(adapter.get_bool("hygiene", "c", false));
        assert!(!adapter.get_bool("hygiene", "d", true));
        assert!(!adapter.get_bool("hygiene", "e", true));
        assert!(adapter.get_bool("hygiene", "f", true));
        assert!(!adapter.get_bool("hygiene", "missing", false));
    }

    #[test]
    fn toggles_from_sections() {
        let adapter = FileConfigAdapter::from_string(SCREEN_INI).unwrap();
        assert!(!adapter.get_bool("strategy", "reclaim_require_green", true));
        assert!(!adapter.get_bool("hygiene", "check_pledge", true));
        assert!(adapter.get_bool("hygiene", "check_qoq_eps", true));
    }

    #[test]
    fn empty_adapter_returns_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("paths", "data_dir"), None);
        assert_eq!(adapter.get_double("regime", "pct_above_50dma_for_on", 45.0), 45.0);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[paths]\noutput = out/watchlist.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("paths", "output"),
            Some("out/watchlist.csv".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/screen.ini").unwrap_err();
        assert!(
            matches!(err, ScreenerError::ConfigParse { ref file, .. } if file.contains("screen.ini"))
        );
    }
}
