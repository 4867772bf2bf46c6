//! Domain error types.
//!
//! Only run-level failures are errors. Per-symbol problems (short history,
//! missing fundamentals, numeric anomalies) are recorded on that symbol's
//! result and never abort a screen.

use crate::domain::universe::UniverseError;

/// Top-level error type for eodscreen.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScreenerError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        ScreenerError::Configuration {
            reason: reason.into(),
        }
    }

    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ScreenerError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) | ScreenerError::Json(_) => 1,
            ScreenerError::Configuration { .. }
            | ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::Data { .. } | ScreenerError::Csv(_) => 3,
            ScreenerError::Universe(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_message() {
        let err = ScreenerError::configuration("universe is empty");
        assert_eq!(err.to_string(), "configuration error: universe is empty");
    }

    #[test]
    fn invalid_error_message_names_section_and_key() {
        let err = ScreenerError::invalid("hygiene", "pledge_pct_max", "must be non-negative");
        assert_eq!(
            err.to_string(),
            "invalid config value [hygiene] pledge_pct_max: must be non-negative"
        );
    }

    #[test]
    fn universe_error_is_transparent() {
        let err: ScreenerError = UniverseError::EmptyToken.into();
        assert_eq!(err.to_string(), "empty token in symbol list");
    }
}
