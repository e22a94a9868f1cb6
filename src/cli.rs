//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_trade_log::CsvTradeLog;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::config_validation::{parse_date, validate_analysis_config};
use crate::domain::error::TradeTrackError;
use crate::domain::forecast::ForecastConfig;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::pipeline::{
    run_assets, AnalysisConfig, AssetOutcome, AssetReport, DEFAULT_RSI_WINDOW, DEFAULT_SMA_WINDOW,
};
use crate::domain::reconcile::MatchStrategy;
use crate::domain::trade::Asset;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::trade_port::TradeLogPort;

pub const DEFAULT_MATCH_TOLERANCE_DAYS: u32 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "tradetrack",
    about = "Price indicators, indicator forecasts, and trade profit/loss tracking"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run indicators, forecasts, and reconciliation for the configured assets
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Analyze a single asset (display name or ticker)
        #[arg(short, long)]
        asset: Option<String>,
        /// Write the full report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available data range per asset
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        asset: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            config,
            asset,
            output,
        } => run_analyze(&config, asset.as_deref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, asset } => run_info(&config, asset.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradeTrackError> {
    FileConfigAdapter::from_file(path).map_err(|e| TradeTrackError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn load_validated(path: &Path) -> Result<FileConfigAdapter, TradeTrackError> {
    let config = load_config(path)?;
    validate_analysis_config(&config)?;
    Ok(config)
}

fn usize_setting(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> usize {
    config.get_int(section, key, default as i64).max(0) as usize
}

pub fn build_forecast_config(config: &dyn ConfigPort) -> ForecastConfig {
    let defaults = ForecastConfig::default();
    ForecastConfig {
        periods: usize_setting(config, "forecast", "periods", defaults.periods),
        yearly_harmonics: usize_setting(
            config,
            "forecast",
            "yearly_harmonics",
            defaults.yearly_harmonics,
        ),
        weekly_harmonics: usize_setting(
            config,
            "forecast",
            "weekly_harmonics",
            defaults.weekly_harmonics,
        ),
        changepoints: usize_setting(config, "forecast", "changepoints", defaults.changepoints),
        changepoint_penalty: config.get_double(
            "forecast",
            "changepoint_penalty",
            defaults.changepoint_penalty,
        ),
    }
}

pub fn build_match_strategy(config: &dyn ConfigPort) -> Result<MatchStrategy, TradeTrackError> {
    let name = config
        .get_string("analysis", "match_strategy")
        .unwrap_or_else(|| "exact".to_string());
    match name.trim().to_lowercase().as_str() {
        "exact" => Ok(MatchStrategy::Exact),
        "nearest" => {
            let days = config.get_int(
                "analysis",
                "match_tolerance_days",
                DEFAULT_MATCH_TOLERANCE_DAYS as i64,
            );
            let max_days = u32::try_from(days).map_err(|_| TradeTrackError::ConfigInvalid {
                section: "analysis".into(),
                key: "match_tolerance_days".into(),
                reason: format!("out of range: {}", days),
            })?;
            Ok(MatchStrategy::NearestPrior { max_days })
        }
        other => Err(TradeTrackError::ConfigInvalid {
            section: "analysis".into(),
            key: "match_strategy".into(),
            reason: format!("unknown match strategy '{}'", other),
        }),
    }
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, TradeTrackError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    Ok(AnalysisConfig {
        start_date,
        end_date,
        sma_window: usize_setting(config, "analysis", "sma_window", DEFAULT_SMA_WINDOW),
        rsi_window: usize_setting(config, "analysis", "rsi_window", DEFAULT_RSI_WINDOW),
        macd_fast: usize_setting(config, "analysis", "macd_fast", DEFAULT_FAST),
        macd_slow: usize_setting(config, "analysis", "macd_slow", DEFAULT_SLOW),
        macd_signal: usize_setting(config, "analysis", "macd_signal", DEFAULT_SIGNAL),
        match_strategy: build_match_strategy(config)?,
        forecast: build_forecast_config(config),
    })
}

/// Configured assets, or the single asset named by `asset_override`. An override matches a
/// configured display name or ticker; an unknown override is used as both name and ticker.
pub fn resolve_assets(asset_override: Option<&str>, config: &dyn ConfigPort) -> Vec<Asset> {
    let configured: Vec<Asset> = config
        .get_section("assets")
        .into_iter()
        .map(|(name, ticker)| Asset::new(name.trim(), ticker.trim()))
        .filter(|a| !a.ticker.is_empty())
        .collect();

    match asset_override.map(str::trim) {
        Some(o) if !o.is_empty() => {
            let found = configured
                .into_iter()
                .find(|a| a.name == o || a.ticker.eq_ignore_ascii_case(o));
            vec![found.unwrap_or_else(|| Asset::new(o, o))]
        }
        _ => configured,
    }
}

fn data_dir(config: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(config.get_string("data", "path").unwrap_or_default().trim())
}

pub fn run_analyze(
    config_path: &Path,
    asset_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_validated(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let analysis = match build_analysis_config(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let assets = resolve_assets(asset_override, &config);
    let trade_path = PathBuf::from(config.get_string("data", "trades").unwrap_or_default().trim());
    let trades = match CsvTradeLog::new(trade_path).load_trades() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = CsvAdapter::new(data_dir(&config));
    eprintln!(
        "Analyzing {} assets, {} to {}",
        assets.len(),
        analysis.start_date,
        analysis.end_date
    );
    let outcomes = run_assets(&data_port, &assets, &trades, &analysis);

    let mut reports = Vec::new();
    let mut first_failure: Option<ExitCode> = None;
    for AssetOutcome { asset, result } in outcomes {
        match result {
            Ok(report) => {
                print_report(&report);
                reports.push(report);
            }
            Err(e) => {
                eprintln!("error: {} ({}): {}", asset.name, asset.ticker, e);
                if first_failure.is_none() {
                    first_failure = Some((&e).into());
                }
            }
        }
    }

    if let Some(output) = output_path {
        let adapter = JsonReportAdapter::new(config.get_bool("report", "pretty", true));
        if let Err(e) = adapter.write(&reports, &output.display().to_string()) {
            eprintln!("error: failed to write report: {e}");
            return (&e).into();
        }
        eprintln!("\nReport written to: {}", output.display());
    }

    match first_failure {
        Some(code) if reports.is_empty() => code,
        _ => ExitCode::SUCCESS,
    }
}

fn print_report(report: &AssetReport) {
    println!("\n=== {} ({}) ===", report.asset.name, report.asset.ticker);
    println!(
        "Bars:            {} ({} to {})",
        report.bar_count, report.start_date, report.end_date
    );
    println!(
        "Latest:          {:.2} on {}",
        report.latest_price, report.latest_date
    );

    for series in &report.indicators {
        match series.defined().last() {
            Some((date, value)) => {
                println!("{:<16} {:.4} on {}", series.indicator_type.to_string(), value, date)
            }
            None => println!("{:<16} n/a", series.indicator_type.to_string()),
        }
    }

    for forecast in &report.forecasts {
        if let Some(last) = forecast.points.last() {
            println!(
                "Forecast {:<16} {:.4} by {}",
                forecast.indicator_type.to_string(),
                last.predicted_value,
                last.date
            );
        }
    }
    for failure in &report.forecast_errors {
        println!(
            "Forecast {:<16} n/a ({})",
            failure.indicator_type.to_string(),
            failure.reason
        );
    }

    if !report.dividends.is_empty() {
        let total: f64 = report.dividends.iter().map(|d| d.amount).sum();
        println!(
            "Dividends:       {} payments, {:.4} total",
            report.dividends.len(),
            total
        );
    }

    let pnl = &report.pnl;
    if pnl.records.is_empty() && pnl.skipped.is_empty() {
        return;
    }

    println!(
        "\n  {:<12} {:<6} {:>14} {:>12} {:>14} {:>14}  {}",
        "Trade Date", "Action", "Amount", "Trade Price", "Current Price", "P/L", "Type"
    );
    for r in &pnl.records {
        println!(
            "  {:<12} {:<6} {:>14.2} {:>12.4} {:>14.4} {:>14.2}  {}",
            r.trade.trade.date.to_string(),
            r.trade.trade.action.to_string(),
            r.trade.trade.amount_usd,
            r.trade.trade_price,
            r.current_price,
            r.profit_or_loss,
            r.classification
        );
    }
    for s in &pnl.skipped {
        println!(
            "  {:<12} {:<6} {:>14.2}  skipped: {:?}",
            s.trade.date.to_string(),
            s.trade.action.to_string(),
            s.trade.amount_usd,
            s.reason
        );
    }
    println!("  Total potential: {:.2}", pnl.total_potential());
    println!("  Total realized:  {:.2}", pnl.total_realized());
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    let config = match load_validated(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = build_analysis_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let assets = resolve_assets(None, &config);
    eprintln!("Config is valid ({} assets)", assets.len());
    ExitCode::SUCCESS
}

pub fn run_info(config_path: &Path, asset_override: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = CsvAdapter::new(data_dir(&config));
    for asset in resolve_assets(asset_override, &config) {
        match data_port.get_data_range(&asset.ticker) {
            Ok(Some((min_date, max_date, count))) => {
                println!(
                    "{} ({}): {} bars, {} to {}",
                    asset.name, asset.ticker, count, min_date, max_date
                );
            }
            Ok(None) => {
                eprintln!("{} ({}): no data found", asset.name, asset.ticker);
            }
            Err(e) => {
                eprintln!("error querying {} ({}): {}", asset.name, asset.ticker, e);
            }
        }
    }
    ExitCode::SUCCESS
}
