//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses the simple-mean variant of Wilder's RSI:
//! - delta[i] = P[i] - P[i-1], with delta[0] = 0
//! - avg_gain / avg_loss: trailing arithmetic mean of gains / losses over n bars
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! If avg_loss == 0 and avg_gain == 0: undefined
//!
//! Warmup: first (n-1) bars are undefined.

use chrono::NaiveDate;
use log::warn;

use crate::domain::error::TradeTrackError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_bar::PriceBar;

/// RSI from trailing averages. A flat window (no gains, no losses) has no defined RSI.
pub fn rsi_from_averages(
    date: NaiveDate,
    avg_gain: f64,
    avg_loss: f64,
) -> Result<f64, TradeTrackError> {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 {
            return Ok(100.0);
        }
        return Err(TradeTrackError::UndefinedIndicator {
            date,
            reason: "average gain and average loss are both zero".into(),
        });
    }
    Ok(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
}

pub fn calculate_rsi(bars: &[PriceBar], window: usize) -> IndicatorSeries {
    if window == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Rsi(window));
    }

    let mut gains = Vec::with_capacity(bars.len());
    let mut losses = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let delta = if i == 0 {
            0.0
        } else {
            bar.adjusted_close - bars[i - 1].adjusted_close
        };
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut undefined_flat = 0usize;

    for (i, bar) in bars.iter().enumerate() {
        if i + 1 < window {
            values.push(IndicatorPoint::undefined(bar.date));
            continue;
        }

        let start = i + 1 - window;
        let avg_gain = gains[start..=i].iter().sum::<f64>() / window as f64;
        let avg_loss = losses[start..=i].iter().sum::<f64>() / window as f64;

        match rsi_from_averages(bar.date, avg_gain, avg_loss) {
            Ok(rsi) => values.push(IndicatorPoint::defined(bar.date, rsi)),
            Err(_) => {
                undefined_flat += 1;
                values.push(IndicatorPoint::undefined(bar.date));
            }
        }
    }

    if undefined_flat > 0 {
        warn!(
            "RSI({}): {} point(s) undefined over flat price windows",
            window, undefined_flat
        );
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(window),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn make_bars(prices: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: price,
                high: price,
                low: price,
                close: price,
                adjusted_close: price,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn rsi_empty_bars() {
        let series = calculate_rsi(&[], 14);
        assert!(series.is_empty());
    }

    #[test]
    fn rsi_single_bar() {
        let series = calculate_rsi(&make_bars(&[100.0]), 14);
        assert_eq!(series.len(), 1);
        assert!(!series.values[0].is_defined());
    }

    #[test]
    fn rsi_warmup_period() {
        let prices: Vec<f64> = (1..=20).map(|i| 100.0 + (i % 5) as f64 * 2.0).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);

        for i in 0..13 {
            assert!(!series.values[i].is_defined(), "Bar {} should be undefined", i);
        }
        assert!(series.values[13].is_defined(), "Bar 13 should be defined");
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);
        assert_relative_eq!(series.values[14].value.unwrap(), 100.0);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);
        assert_relative_eq!(series.values[14].value.unwrap(), 0.0);
    }

    #[test]
    fn rsi_flat_window_is_undefined() {
        let series = calculate_rsi(&make_bars(&[50.0; 20]), 14);
        assert_eq!(series.len(), 20);
        assert_eq!(series.defined_count(), 0);
    }

    #[test]
    fn rsi_flat_guard_returns_error() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let result = rsi_from_averages(date, 0.0, 0.0);
        assert!(matches!(
            result,
            Err(TradeTrackError::UndefinedIndicator { .. })
        ));
        assert_eq!(rsi_from_averages(date, 1.5, 0.0).unwrap(), 100.0);
    }

    #[test]
    fn rsi_known_value() {
        // gains: 0, 2, 0 -> 2/3; losses: 0, 0, 1 -> 1/3; RS = 2; RSI = 66.67
        let series = calculate_rsi(&make_bars(&[10.0, 12.0, 11.0]), 3);
        assert_relative_eq!(
            series.values[2].value.unwrap(),
            100.0 - 100.0 / 3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn rsi_zero_window() {
        let series = calculate_rsi(&make_bars(&[100.0, 101.0]), 0);
        assert!(series.is_empty());
        assert_eq!(series.indicator_type, IndicatorType::Rsi(0));
    }

    proptest! {
        #[test]
        fn rsi_bounded(
            prices in prop::collection::vec(1.0f64..1_000.0, 2..150),
            window in 1usize..30,
        ) {
            let series = calculate_rsi(&make_bars(&prices), window);
            for (i, point) in series.values.iter().enumerate() {
                if i + 1 < window {
                    prop_assert!(!point.is_defined());
                }
                if let Some(rsi) = point.value {
                    prop_assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
                }
            }
        }
    }
}
