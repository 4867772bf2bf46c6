//! Configuration validation.
//!
//! Every key has a default, so validation only rejects values that are
//! present and out of range. Runs before any data is loaded.

use crate::domain::error::ScreenerError;
use crate::domain::hygiene::GrowthRule;
use crate::domain::ranker::HygienePolicy;
use crate::ports::config_port::ConfigPort;

const WINDOW_KEYS: &[(&str, i64)] = &[
    ("min_history", 60),
    ("sma_fast", 20),
    ("sma_slow", 50),
    ("slope_window", 10),
    ("momentum_window", 20),
    ("rsi_period", 14),
    ("rsi_rising_lookback", 10),
    ("atr_period", 14),
    ("reclaim_support_window", 20),
    ("reclaim_recent_window", 10),
    ("volume_lookback", 20),
    ("five_day_short", 5),
    ("five_day_long", 50),
    ("rs_lookback_days", 20),
];

pub fn validate_screen_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_universe(config)?;
    validate_strategy(config)?;
    validate_hygiene(config)?;
    validate_ranking(config)?;
    validate_regime(config)?;
    Ok(())
}

fn validate_universe(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    match config.get_string("universe", "series_marker") {
        Some(s) if s.trim().is_empty() => Err(ScreenerError::invalid(
            "universe",
            "series_marker",
            "series_marker must not be empty",
        )),
        _ => Ok(()),
    }
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    for (key, default) in WINDOW_KEYS {
        if config.get_int("strategy", key, *default) < 1 {
            return Err(ScreenerError::invalid(
                "strategy",
                key,
                format!("{key} must be at least 1"),
            ));
        }
    }

    let sma_fast = config.get_int("strategy", "sma_fast", 20);
    let sma_slow = config.get_int("strategy", "sma_slow", 50);
    if sma_fast >= sma_slow {
        return Err(ScreenerError::invalid(
            "strategy",
            "sma_fast",
            "sma_fast must be shorter than sma_slow",
        ));
    }

    let low = config.get_double("strategy", "rsi_band_low", 20.0);
    let high = config.get_double("strategy", "rsi_band_high", 38.0);
    for (key, value) in [("rsi_band_low", low), ("rsi_band_high", high)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(ScreenerError::invalid(
                "strategy",
                key,
                format!("{key} must be between 0 and 100"),
            ));
        }
    }
    if low >= high {
        return Err(ScreenerError::invalid(
            "strategy",
            "rsi_band_low",
            "rsi_band_low must be below rsi_band_high",
        ));
    }

    for (key, default) in [
        ("momentum_scale_pct", 10.0),
        ("volume_thrust_multiplier", 1.8),
        ("five_day_thrust_ratio", 1.3),
    ] {
        if config.get_double("strategy", key, default) <= 0.0 {
            return Err(ScreenerError::invalid(
                "strategy",
                key,
                format!("{key} must be positive"),
            ));
        }
    }

    for (key, default) in [
        ("entry_buffer_pct", 0.1),
        ("stop_atr_multiplier", 1.0),
        ("stop_min_buffer_pct", 2.2),
    ] {
        if config.get_double("strategy", key, default) < 0.0 {
            return Err(ScreenerError::invalid(
                "strategy",
                key,
                format!("{key} must be non-negative"),
            ));
        }
    }
    Ok(())
}

fn validate_hygiene(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    for (key, default) in [
        ("debt_to_equity_max", 1.5),
        ("interest_coverage_min", 2.5),
        ("pledge_pct_max", 20.0),
    ] {
        if config.get_double("hygiene", key, default) < 0.0 {
            return Err(ScreenerError::invalid(
                "hygiene",
                key,
                format!("{key} must be non-negative"),
            ));
        }
    }

    let pledge = config.get_double("hygiene", "pledge_pct_max", 20.0);
    if pledge > 100.0 {
        return Err(ScreenerError::invalid(
            "hygiene",
            "pledge_pct_max",
            "pledge_pct_max is a percentage and must not exceed 100",
        ));
    }

    let qoq = config.get_double("hygiene", "qoq_min_positive", 1.0);
    if !(0.0..=3.0).contains(&qoq) {
        return Err(ScreenerError::invalid(
            "hygiene",
            "qoq_min_positive",
            "qoq_min_positive must be between 0 and 3",
        ));
    }

    if let Some(rule) = config.get_string("hygiene", "growth_rule") {
        if GrowthRule::parse(&rule).is_none() {
            return Err(ScreenerError::invalid(
                "hygiene",
                "growth_rule",
                format!("unknown growth_rule '{rule}', expected both or either"),
            ));
        }
    }
    Ok(())
}

fn validate_ranking(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if let Some(policy) = config.get_string("ranking", "hygiene_policy") {
        if HygienePolicy::parse(&policy).is_none() {
            return Err(ScreenerError::invalid(
                "ranking",
                "hygiene_policy",
                format!("unknown hygiene_policy '{policy}'"),
            ));
        }
    }
    if config.get_int("ranking", "max_candidates", 0) < 0 {
        return Err(ScreenerError::invalid(
            "ranking",
            "max_candidates",
            "max_candidates must be non-negative",
        ));
    }
    Ok(())
}

fn validate_regime(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let pct = config.get_double("regime", "pct_above_50dma_for_on", 45.0);
    if !(0.0..=100.0).contains(&pct) {
        return Err(ScreenerError::invalid(
            "regime",
            "pct_above_50dma_for_on",
            "pct_above_50dma_for_on must be between 0 and 100",
        ));
    }
    Ok(())
}
