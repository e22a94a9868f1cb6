//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow, signal) - 1 bars, shared by all three lines.

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_bar::PriceBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

impl MacdSeries {
    fn empty(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            line: IndicatorSeries::empty(IndicatorType::Macd { fast, slow, signal }),
            signal: IndicatorSeries::empty(IndicatorType::MacdSignal { fast, slow, signal }),
            histogram: IndicatorSeries::empty(IndicatorType::MacdHistogram { fast, slow, signal }),
        }
    }

    pub fn into_series(self) -> [IndicatorSeries; 3] {
        [self.line, self.signal, self.histogram]
    }
}

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_span: usize,
) -> MacdSeries {
    if bars.is_empty() || fast == 0 || slow == 0 || signal_span == 0 {
        return MacdSeries::empty(fast, slow, signal_span);
    }

    let prices: Vec<f64> = bars.iter().map(|b| b.adjusted_close).collect();
    let ema_fast = ema_values(&prices, fast);
    let ema_slow = ema_values(&prices, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_values(&macd_line, signal_span);

    let warmup = fast.max(slow).max(signal_span) - 1;

    let mut line = Vec::with_capacity(bars.len());
    let mut signal = Vec::with_capacity(bars.len());
    let mut histogram = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if i < warmup {
            line.push(IndicatorPoint::undefined(bar.date));
            signal.push(IndicatorPoint::undefined(bar.date));
            histogram.push(IndicatorPoint::undefined(bar.date));
        } else {
            line.push(IndicatorPoint::defined(bar.date, macd_line[i]));
            signal.push(IndicatorPoint::defined(bar.date, signal_line[i]));
            histogram.push(IndicatorPoint::defined(
                bar.date,
                macd_line[i] - signal_line[i],
            ));
        }
    }

    MacdSeries {
        line: IndicatorSeries {
            indicator_type: IndicatorType::Macd {
                fast,
                slow,
                signal: signal_span,
            },
            values: line,
        },
        signal: IndicatorSeries {
            indicator_type: IndicatorType::MacdSignal {
                fast,
                slow,
                signal: signal_span,
            },
            values: signal,
        },
        histogram: IndicatorSeries {
            indicator_type: IndicatorType::MacdHistogram {
                fast,
                slow,
                signal: signal_span,
            },
            values: histogram,
        },
    }
}

pub fn calculate_macd_default(bars: &[PriceBar]) -> MacdSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
