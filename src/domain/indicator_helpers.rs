//! Batch indicator computation and row alignment across indicators.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::domain::indicator::{
    calculate_ema, calculate_macd, calculate_rsi, calculate_sma, IndicatorPoint, IndicatorSeries,
    IndicatorType,
};
use crate::domain::price_series::PriceSeries;

/// Compute every requested indicator over `series`, keyed by type. MACD variants share one
/// calculation.
pub fn compute_indicators(
    series: &PriceSeries,
    types: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    let bars = series.bars();
    let mut out: HashMap<IndicatorType, IndicatorSeries> = HashMap::new();

    for indicator_type in types {
        if out.contains_key(indicator_type) {
            continue;
        }
        match *indicator_type {
            IndicatorType::AdjustedClose => {
                out.insert(*indicator_type, series.adjusted_close_series());
            }
            IndicatorType::PercentChange => {
                out.insert(*indicator_type, series.percent_change_series());
            }
            IndicatorType::Sma(window) => {
                out.insert(*indicator_type, calculate_sma(bars, window));
            }
            IndicatorType::Ema(span) => {
                out.insert(*indicator_type, calculate_ema(bars, span));
            }
            IndicatorType::Rsi(window) => {
                out.insert(*indicator_type, calculate_rsi(bars, window));
            }
            IndicatorType::Macd { fast, slow, signal }
            | IndicatorType::MacdSignal { fast, slow, signal }
            | IndicatorType::MacdHistogram { fast, slow, signal } => {
                for s in calculate_macd(bars, fast, slow, signal).into_series() {
                    if types.contains(&s.indicator_type) {
                        out.insert(s.indicator_type, s);
                    }
                }
            }
        }
    }

    out
}

/// Indicators restricted to the dates where every one of them is defined.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<IndicatorSeries>,
}

impl IndicatorFrame {
    /// Drops every row in which any indicator is undefined. Column order follows `order`.
    pub fn aligned(
        indicators: &HashMap<IndicatorType, IndicatorSeries>,
        order: &[IndicatorType],
    ) -> Self {
        let selected: Vec<&IndicatorSeries> =
            order.iter().filter_map(|t| indicators.get(t)).collect();
        if selected.is_empty() {
            return Self {
                dates: Vec::new(),
                columns: Vec::new(),
            };
        }

        let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for s in &selected {
            for (date, _) in s.defined() {
                *counts.entry(date).or_default() += 1;
            }
        }
        let dates: Vec<NaiveDate> = counts
            .into_iter()
            .filter(|(_, n)| *n == selected.len())
            .map(|(d, _)| d)
            .collect();

        let columns = selected
            .iter()
            .map(|s| {
                let by_date: HashMap<NaiveDate, f64> = s.defined().into_iter().collect();
                IndicatorSeries {
                    indicator_type: s.indicator_type,
                    values: dates
                        .iter()
                        .map(|d| IndicatorPoint {
                            date: *d,
                            value: by_date.get(d).copied(),
                        })
                        .collect(),
                }
            })
            .collect();

        Self { dates, columns }
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn column(&self, indicator_type: IndicatorType) -> Option<&IndicatorSeries> {
        self.columns
            .iter()
            .find(|c| c.indicator_type == indicator_type)
    }
}
