//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(P[i-j] for j in 0..n) / n over adjusted closes.
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_bar::PriceBar;

pub fn calculate_sma(bars: &[PriceBar], window: usize) -> IndicatorSeries {
    if window == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Sma(window));
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        sum += bar.adjusted_close;
        if i >= window {
            sum -= bars[i - window].adjusted_close;
        }

        if i + 1 < window {
            values.push(IndicatorPoint::undefined(bar.date));
        } else if window == 1 {
            values.push(IndicatorPoint::defined(bar.date, bar.adjusted_close));
        } else {
            values.push(IndicatorPoint::defined(bar.date, sum / window as f64));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(window),
        values,
    }
}
