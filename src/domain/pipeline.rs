//! Per-asset analysis pipeline: price series -> indicators -> forecasts -> reconciliation.
//!
//! An indicator that cannot be forecast is recorded in `forecast_errors`; only an unusable
//! adjusted-close history fails the asset. Assets are independent. `run_assets` runs them in
//! parallel and keeps one result per asset, so a failure for one never affects another.

use chrono::NaiveDate;
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::error::TradeTrackError;
use crate::domain::forecast::{forecast_series, Forecast, ForecastConfig};
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{compute_indicators, IndicatorFrame};
use crate::domain::price_bar::{dividends_since, DividendEvent};
use crate::domain::price_series::PriceSeries;
use crate::domain::reconcile::{reconcile, MatchStrategy, ReconciliationReport};
use crate::domain::trade::{Asset, Trade};
use crate::ports::data_port::PriceDataPort;

pub const DEFAULT_SMA_WINDOW: usize = 20;
pub const DEFAULT_RSI_WINDOW: usize = 14;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub sma_window: usize,
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub match_strategy: MatchStrategy,
    pub forecast: ForecastConfig,
}

impl AnalysisConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            sma_window: DEFAULT_SMA_WINDOW,
            rsi_window: DEFAULT_RSI_WINDOW,
            macd_fast: DEFAULT_FAST,
            macd_slow: DEFAULT_SLOW,
            macd_signal: DEFAULT_SIGNAL,
            match_strategy: MatchStrategy::Exact,
            forecast: ForecastConfig::default(),
        }
    }

    pub fn indicator_types(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Sma(self.sma_window),
            IndicatorType::Rsi(self.rsi_window),
            IndicatorType::Macd {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
            IndicatorType::MacdSignal {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
        ]
    }
}

/// An indicator whose aligned history could not be forecast.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastFailure {
    pub indicator_type: IndicatorType,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetReport {
    pub asset: Asset,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub latest_date: NaiveDate,
    pub latest_price: f64,
    pub percent_change: IndicatorSeries,
    /// Indicators restricted to the rows where all of them are defined.
    pub indicators: Vec<IndicatorSeries>,
    pub forecasts: Vec<Forecast>,
    pub forecast_errors: Vec<ForecastFailure>,
    pub pnl: ReconciliationReport,
    pub dividends: Vec<DividendEvent>,
}

#[derive(Debug)]
pub struct AssetOutcome {
    pub asset: Asset,
    pub result: Result<AssetReport, TradeTrackError>,
}

pub fn run_asset_pipeline(
    asset: &Asset,
    series: &PriceSeries,
    trades: &[Trade],
    dividends: &[DividendEvent],
    config: &AnalysisConfig,
) -> Result<AssetReport, TradeTrackError> {
    let series = series.restrict(config.start_date, config.end_date);
    let latest = series.latest().ok_or_else(|| TradeTrackError::EmptySeries {
        ticker: asset.ticker.clone(),
    })?;

    let types = config.indicator_types();
    let indicators = compute_indicators(&series, &types);
    let frame = IndicatorFrame::aligned(&indicators, &types);

    let mut forecasts = Vec::new();
    let mut forecast_errors = Vec::new();
    if config.forecast.periods > 0 {
        forecasts.push(forecast_series(
            &series.adjusted_close_series(),
            &config.forecast,
        )?);
        for column in &frame.columns {
            match forecast_series(column, &config.forecast) {
                Ok(forecast) => forecasts.push(forecast),
                Err(e) => {
                    warn!(
                        "{}: no forecast for {}: {}",
                        asset.name, column.indicator_type, e
                    );
                    forecast_errors.push(ForecastFailure {
                        indicator_type: column.indicator_type,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    let pnl = reconcile(
        &asset.name,
        trades,
        &series,
        latest.adjusted_close,
        config.match_strategy,
    )?;

    Ok(AssetReport {
        asset: asset.clone(),
        start_date: config.start_date,
        end_date: config.end_date,
        bar_count: series.len(),
        latest_date: latest.date,
        latest_price: latest.adjusted_close,
        percent_change: series.percent_change_series(),
        indicators: frame.columns,
        forecasts,
        forecast_errors,
        pnl,
        dividends: dividends_since(dividends, config.start_date),
    })
}

fn run_one(
    data_port: &(dyn PriceDataPort + Sync),
    asset: &Asset,
    trades: &[Trade],
    config: &AnalysisConfig,
) -> Result<AssetReport, TradeTrackError> {
    let bars = data_port.fetch_prices(&asset.ticker, config.start_date, config.end_date)?;
    let series = PriceSeries::new(asset.ticker.clone(), bars);
    info!("{} ({}): {} bars", asset.name, asset.ticker, series.len());

    let dividends = data_port.fetch_dividends(&asset.ticker).unwrap_or_else(|e| {
        warn!("no dividend data for {}: {}", asset.ticker, e);
        Vec::new()
    });

    run_asset_pipeline(asset, &series, trades, &dividends, config)
}

/// Run every asset's pipeline independently. Output order follows `assets`.
pub fn run_assets(
    data_port: &(dyn PriceDataPort + Sync),
    assets: &[Asset],
    trades: &[Trade],
    config: &AnalysisConfig,
) -> Vec<AssetOutcome> {
    assets
        .par_iter()
        .map(|asset| {
            let result = run_one(data_port, asset, trades, config);
            if let Err(e) = &result {
                warn!("analysis failed for {}: {}", asset.name, e);
            }
            AssetOutcome {
                asset: asset.clone(),
                result,
            }
        })
        .collect()
}
