//! Configuration validation.
//!
//! Validates every config field before an analysis runs.

use crate::domain::error::TradeTrackError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), TradeTrackError> {
    validate_data_paths(config)?;
    validate_dates(config)?;
    validate_windows(config)?;
    validate_macd(config)?;
    validate_match_strategy(config)?;
    validate_forecast(config)?;
    validate_assets(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TradeTrackError {
    TradeTrackError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn missing(section: &str, key: &str) -> TradeTrackError {
    TradeTrackError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn validate_data_paths(config: &dyn ConfigPort) -> Result<(), TradeTrackError> {
    for key in ["path", "trades"] {
        match config.get_string("data", key) {
            Some(v) if !v.trim().is_empty() => {}
            _ => return Err(missing("data", key)),
        }
    }
    Ok(())
}

pub fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, TradeTrackError> {
    let value = config
        .get_string("analysis", key)
        .ok_or_else(|| missing("analysis", key))?;
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| invalid("analysis", key, "invalid date format (expected YYYY-MM-DD)"))
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), TradeTrackError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;
    if start > end {
        return Err(invalid(
            "analysis",
            "end_date",
            "end_date must not be before start_date",
        ));
    }
    Ok(())
}

fn validate_positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<(), TradeTrackError> {
    if config.get_int(section, key, default) < 1 {
        return Err(invalid(section, key, &format!("{} must be at least 1", key)));
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), TradeTrackError> {
    validate_positive_int(config, "analysis", "sma_window", 20)?;
    validate_positive_int(config, "analysis", "rsi_window", 14)?;
    Ok(())
}

fn validate_macd(config: &dyn ConfigPort) -> Result<(), TradeTrackError> {
    validate_positive_int(config, "analysis", "macd_fast", 12)?;
    validate_positive_int(config, "analysis", "macd_slow", 26)?;
    validate_positive_int(config, "analysis", "macd_signal", 9)?;
    let fast = config.get_int("analysis", "macd_fast", 12);
    let slow = config.get_int("analysis", "macd_slow", 26);
    if fast >= slow {
        return Err(invalid(
            "analysis",
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }
    Ok(())
}

fn validate_match_strategy(config: &dyn ConfigPort) -> Result<(), TradeTrackError> {
    let strategy = config
        .get_string("analysis", "match_strategy")
        .unwrap_or_else(|| "exact".to_string());
    match strategy.trim().to_lowercase().as_str() {
        "exact" => Ok(()),
        "nearest" => {
            if config.get_int("analysis", "match_tolerance_days", 3) < 0 {
                return Err(invalid(
                    "analysis",
                    "match_tolerance_days",
                    "match_tolerance_days must be non-negative",
                ));
            }
            Ok(())
        }
        _ => Err(invalid(
            "analysis",
            "match_strategy",
            "match_strategy must be 'exact' or 'nearest'",
        )),
    }
}

fn validate_forecast(config: &dyn ConfigPort) -> Result<(), TradeTrackError> {
    for key in ["periods", "yearly_harmonics", "weekly_harmonics", "changepoints"] {
        if config.get_int("forecast", key, 0) < 0 {
            return Err(invalid(
                "forecast",
                key,
                &format!("{} must be non-negative", key),
            ));
        }
    }
    if config.get_double("forecast", "changepoint_penalty", 1.0) < 0.0 {
        return Err(invalid(
            "forecast",
            "changepoint_penalty",
            "changepoint_penalty must be non-negative",
        ));
    }
    Ok(())
}

fn validate_assets(config: &dyn ConfigPort) -> Result<(), TradeTrackError> {
    let assets = config.get_section("assets");
    if assets.is_empty() {
        return Err(invalid("assets", "*", "at least one asset is required"));
    }
    for (name, ticker) in assets {
        if ticker.trim().is_empty() {
            return Err(invalid("assets", &name, "ticker must not be empty"));
        }
    }
    Ok(())
}
