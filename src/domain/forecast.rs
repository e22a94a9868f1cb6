//! Additive trend + Fourier seasonality forecaster.
//!
//! value(t) = trend(t) + yearly(t) + weekly(t) + noise, fit jointly by (ridge-stabilised)
//! least squares. The trend is linear in the business-day index measured from the first
//! observation, optionally with hinge terms at evenly spaced changepoints over the first 80%
//! of history. Seasonal terms are truncated Fourier series over calendar days and are only
//! included once the history spans two full periods.

use chrono::NaiveDate;
use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use std::f64::consts::PI;

use crate::domain::calendar::{business_days_between, next_business_days};
use crate::domain::error::TradeTrackError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub const MIN_FORECAST_HISTORY: usize = 30;
pub const YEARLY_PERIOD_DAYS: f64 = 365.25;
pub const WEEKLY_PERIOD_DAYS: f64 = 7.0;

const CHANGEPOINT_RANGE: f64 = 0.8;
const SEASONAL_RIDGE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub periods: usize,
    pub yearly_harmonics: usize,
    pub weekly_harmonics: usize,
    pub changepoints: usize,
    pub changepoint_penalty: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            periods: 30,
            yearly_harmonics: 4,
            weekly_harmonics: 3,
            changepoints: 0,
            changepoint_penalty: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub indicator_type: IndicatorType,
    pub points: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Seasonality {
    period: f64,
    harmonics: usize,
}

/// A fitted model. Holds everything needed to evaluate the curve at any date.
#[derive(Debug, Clone)]
pub struct TrendSeasonalModel {
    origin: NaiveDate,
    last_date: NaiveDate,
    t_scale: f64,
    y_offset: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    coefficients: Vec<f64>,
}

impl TrendSeasonalModel {
    /// Fit on `(date, value)` observations in ascending date order.
    pub fn fit(
        observations: &[(NaiveDate, f64)],
        config: &ForecastConfig,
    ) -> Result<Self, TradeTrackError> {
        let n = observations.len();
        if n < MIN_FORECAST_HISTORY {
            return Err(TradeTrackError::InsufficientHistory {
                observations: n,
                minimum: MIN_FORECAST_HISTORY,
            });
        }

        let origin = observations[0].0;
        let last_date = observations[n - 1].0;
        let span_days = (last_date - origin).num_days() as f64;
        let t_scale = (business_days_between(origin, last_date) as f64).max(1.0);

        let mut seasonalities = Vec::new();
        if config.yearly_harmonics > 0 && span_days >= 2.0 * YEARLY_PERIOD_DAYS {
            seasonalities.push(Seasonality {
                period: YEARLY_PERIOD_DAYS,
                harmonics: config.yearly_harmonics,
            });
        }
        if config.weekly_harmonics > 0 && span_days >= 2.0 * WEEKLY_PERIOD_DAYS {
            seasonalities.push(Seasonality {
                period: WEEKLY_PERIOD_DAYS,
                harmonics: config.weekly_harmonics,
            });
        }

        let changepoints: Vec<f64> = (1..=config.changepoints)
            .map(|j| CHANGEPOINT_RANGE * j as f64 / (config.changepoints as f64 + 1.0))
            .collect();

        let values: Vec<f64> = observations.iter().map(|(_, v)| *v).collect();
        let y_offset = values.iter().sum::<f64>() / n as f64;
        let max_dev = values
            .iter()
            .map(|v| (v - y_offset).abs())
            .fold(0.0, f64::max);
        let y_scale = if max_dev > 0.0 { max_dev } else { 1.0 };

        let mut model = Self {
            origin,
            last_date,
            t_scale,
            y_offset,
            y_scale,
            changepoints,
            seasonalities,
            coefficients: Vec::new(),
        };

        let p = model.parameter_count();
        if n < p + 1 {
            return Err(TradeTrackError::InsufficientHistory {
                observations: n,
                minimum: p + 1,
            });
        }

        let mut rows = Vec::with_capacity(n * p);
        for (date, _) in observations {
            rows.extend(model.features(*date));
        }
        let x = DMatrix::from_row_slice(n, p, &rows);
        let y = DVector::from_iterator(n, values.iter().map(|v| (v - y_offset) / y_scale));

        let mut xtx = x.tr_mul(&x);
        let xty = x.tr_mul(&y);

        let cp_start = 2;
        let seasonal_start = cp_start + model.changepoints.len();
        for i in cp_start..seasonal_start {
            xtx[(i, i)] += config.changepoint_penalty * n as f64;
        }
        for i in seasonal_start..p {
            xtx[(i, i)] += SEASONAL_RIDGE * n as f64;
        }

        let beta = match xtx.clone().cholesky() {
            Some(chol) => chol.solve(&xty),
            None => xtx.lu().solve(&xty).ok_or_else(|| TradeTrackError::ModelFit {
                reason: "normal equations are singular".into(),
            })?,
        };

        model.coefficients = beta.iter().copied().collect();
        debug!(
            "fitted trend+seasonal model: {} observations, {} parameters, {} seasonal component(s)",
            n,
            p,
            model.seasonalities.len()
        );
        Ok(model)
    }

    fn parameter_count(&self) -> usize {
        2 + self.changepoints.len()
            + self
                .seasonalities
                .iter()
                .map(|s| 2 * s.harmonics)
                .sum::<usize>()
    }

    fn features(&self, date: NaiveDate) -> Vec<f64> {
        let t = business_days_between(self.origin, date) as f64 / self.t_scale;
        let day = (date - self.origin).num_days() as f64;

        let mut row = Vec::with_capacity(self.parameter_count());
        row.push(1.0);
        row.push(t);
        for &c in &self.changepoints {
            row.push((t - c).max(0.0));
        }
        for s in &self.seasonalities {
            for k in 1..=s.harmonics {
                let angle = 2.0 * PI * k as f64 * day / s.period;
                row.push(angle.sin());
                row.push(angle.cos());
            }
        }
        row
    }

    pub fn predict(&self, date: NaiveDate) -> f64 {
        let scaled: f64 = self
            .features(date)
            .iter()
            .zip(&self.coefficients)
            .map(|(f, b)| f * b)
            .sum();
        scaled * self.y_scale + self.y_offset
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last_date
    }

    pub fn has_seasonality(&self) -> bool {
        !self.seasonalities.is_empty()
    }

    /// Predictions for the next `periods` business days after the last observation.
    pub fn project(&self, periods: usize) -> Vec<ForecastPoint> {
        next_business_days(self.last_date, periods)
            .into_iter()
            .map(|date| ForecastPoint {
                date,
                predicted_value: self.predict(date),
            })
            .collect()
    }
}

/// Fit a fresh model on the defined points of `series` and project `config.periods`
/// business days ahead.
pub fn forecast_series(
    series: &IndicatorSeries,
    config: &ForecastConfig,
) -> Result<Forecast, TradeTrackError> {
    let observations = series.defined();
    let model = TrendSeasonalModel::fit(&observations, config)?;
    Ok(Forecast {
        indicator_type: series.indicator_type,
        points: model.project(config.periods),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::is_business_day;
    use crate::domain::indicator::IndicatorPoint;
    use approx::assert_abs_diff_eq;
    use chrono::Duration;

    fn weekdays_from(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(count);
        let mut d = start;
        while dates.len() < count {
            if is_business_day(d) {
                dates.push(d);
            }
            d += Duration::days(1);
        }
        dates
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn series_of(indicator_type: IndicatorType, obs: &[(NaiveDate, f64)]) -> IndicatorSeries {
        IndicatorSeries {
            indicator_type,
            values: obs
                .iter()
                .map(|(d, v)| IndicatorPoint::defined(*d, *v))
                .collect(),
        }
    }

    #[test]
    fn linear_series_reproduces_trend() {
        let dates = weekdays_from(start(), 60);
        let obs: Vec<(NaiveDate, f64)> = dates
            .iter()
            .enumerate()
            .map(|(i, d)| (*d, 5.0 + 0.5 * i as f64))
            .collect();

        let config = ForecastConfig {
            periods: 10,
            ..ForecastConfig::default()
        };
        let forecast = forecast_series(&series_of(IndicatorType::AdjustedClose, &obs), &config)
            .unwrap();

        assert_eq!(forecast.points.len(), 10);
        for (j, point) in forecast.points.iter().enumerate() {
            let expected = 5.0 + 0.5 * (60 + j) as f64;
            assert_abs_diff_eq!(point.predicted_value, expected, epsilon = 1e-6);
            assert!(is_business_day(point.date));
        }
    }

    #[test]
    fn forecast_dates_follow_last_observation() {
        let dates = weekdays_from(start(), 40);
        let obs: Vec<(NaiveDate, f64)> = dates.iter().map(|d| (*d, 10.0)).collect();
        let model = TrendSeasonalModel::fit(&obs, &ForecastConfig::default()).unwrap();
        let points = model.project(5);

        assert_eq!(points[0].date, next_business_days(model.last_date(), 1)[0]);
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        for p in &points {
            assert_abs_diff_eq!(p.predicted_value, 10.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn weekly_seasonality_is_projected() {
        let obs: Vec<(NaiveDate, f64)> = (0..91)
            .map(|i| {
                let d = start() + Duration::days(i);
                (d, 10.0 + (2.0 * PI * i as f64 / 7.0).sin())
            })
            .collect();

        let model = TrendSeasonalModel::fit(&obs, &ForecastConfig::default()).unwrap();
        assert!(model.has_seasonality());

        for point in model.project(10) {
            let day = (point.date - start()).num_days() as f64;
            let expected = 10.0 + (2.0 * PI * day / 7.0).sin();
            assert_abs_diff_eq!(point.predicted_value, expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn yearly_seasonality_needs_two_years() {
        let dates = weekdays_from(start(), 300);
        let obs: Vec<(NaiveDate, f64)> = dates.iter().map(|d| (*d, 1.0)).collect();
        let config = ForecastConfig {
            weekly_harmonics: 0,
            ..ForecastConfig::default()
        };
        let model = TrendSeasonalModel::fit(&obs, &config).unwrap();
        assert!(!model.has_seasonality());
    }

    #[test]
    fn changepoints_follow_recent_slope() {
        let dates = weekdays_from(start(), 100);
        let obs: Vec<(NaiveDate, f64)> = dates
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let v = if i < 60 { 100.0 } else { 100.0 + (i - 60) as f64 };
                (*d, v)
            })
            .collect();

        let linear = ForecastConfig {
            periods: 10,
            weekly_harmonics: 0,
            ..ForecastConfig::default()
        };
        let piecewise = ForecastConfig {
            changepoints: 8,
            changepoint_penalty: 1e-9,
            ..linear.clone()
        };

        let lin = TrendSeasonalModel::fit(&obs, &linear).unwrap().project(10);
        let pw = TrendSeasonalModel::fit(&obs, &piecewise).unwrap().project(10);

        assert!(pw[9].predicted_value > lin[9].predicted_value);
        let slope = (pw[9].predicted_value - pw[0].predicted_value) / 9.0;
        assert!((slope - 1.0).abs() < 0.15, "slope {}", slope);
    }

    #[test]
    fn fewer_than_30_points_is_insufficient() {
        let dates = weekdays_from(start(), 29);
        let obs: Vec<(NaiveDate, f64)> = dates.iter().map(|d| (*d, 1.0)).collect();
        let err = TrendSeasonalModel::fit(&obs, &ForecastConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TradeTrackError::InsufficientHistory {
                observations: 29,
                minimum: MIN_FORECAST_HISTORY
            }
        ));
    }

    #[test]
    fn more_parameters_than_points_is_insufficient() {
        let dates = weekdays_from(start(), 35);
        let obs: Vec<(NaiveDate, f64)> = dates.iter().map(|d| (*d, 1.0)).collect();
        let config = ForecastConfig {
            changepoints: 40,
            ..ForecastConfig::default()
        };
        let err = TrendSeasonalModel::fit(&obs, &config).unwrap_err();
        assert!(matches!(err, TradeTrackError::InsufficientHistory { observations: 35, .. }));
    }

    #[test]
    fn undefined_points_are_dropped_before_fitting() {
        let dates = weekdays_from(start(), 40);
        let mut series = series_of(
            IndicatorType::Sma(20),
            &dates
                .iter()
                .enumerate()
                .map(|(i, d)| (*d, i as f64))
                .collect::<Vec<_>>(),
        );
        for point in series.values.iter_mut().take(19) {
            point.value = None;
        }
        // 21 defined points remain
        let err = forecast_series(&series, &ForecastConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TradeTrackError::InsufficientHistory { observations: 21, .. }
        ));
    }
}
