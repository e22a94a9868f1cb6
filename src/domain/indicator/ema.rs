//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first observed price, then EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! The recurrence runs from the first bar; the first (n-1) outputs are reported as warmup.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_bar::PriceBar;

/// Raw EMA recurrence over `prices`, one output per input. Empty when `span` is 0.
pub fn ema_values(prices: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || prices.is_empty() {
        return Vec::new();
    }

    let k = 2.0 / (span as f64 + 1.0);
    let mut values = Vec::with_capacity(prices.len());
    let mut ema = prices[0];
    values.push(ema);

    for &price in &prices[1..] {
        ema = price * k + ema * (1.0 - k);
        values.push(ema);
    }
    values
}

pub fn calculate_ema(bars: &[PriceBar], span: usize) -> IndicatorSeries {
    if span == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Ema(span));
    }

    let prices: Vec<f64> = bars.iter().map(|b| b.adjusted_close).collect();
    let raw = ema_values(&prices, span);

    let values = bars
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(i, (bar, ema))| {
            if i + 1 < span {
                IndicatorPoint::undefined(bar.date)
            } else {
                IndicatorPoint::defined(bar.date, ema)
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}
