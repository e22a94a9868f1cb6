//! Normalized, immutable daily price history for one instrument.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::error::TradeTrackError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_bar::PriceBar;

#[derive(Debug, Clone, Serialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Sorts `bars` by date and drops duplicates; for a repeated date the later bar wins.
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
        for bar in bars {
            by_date.insert(bar.date, bar);
        }
        Self {
            ticker: ticker.into(),
            bars: by_date.into_values().collect(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Exact-date lookup. No fallback to neighbouring days.
    pub fn get(&self, date: NaiveDate) -> Result<&PriceBar, TradeTrackError> {
        self.bars
            .binary_search_by_key(&date, |b| b.date)
            .map(|i| &self.bars[i])
            .map_err(|_| TradeTrackError::NotFound {
                ticker: self.ticker.clone(),
                date,
            })
    }

    /// Latest bar on or before `date`, at most `max_days` calendar days earlier.
    pub fn nearest_on_or_before(&self, date: NaiveDate, max_days: u32) -> Option<&PriceBar> {
        let idx = self.bars.partition_point(|b| b.date <= date);
        let bar = self.bars[..idx].last()?;
        if (date - bar.date).num_days() <= i64::from(max_days) {
            Some(bar)
        } else {
            None
        }
    }

    /// Bars with `start <= date <= end`.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> &[PriceBar] {
        if start > end {
            return &[];
        }
        let lo = self.bars.partition_point(|b| b.date < start);
        let hi = self.bars.partition_point(|b| b.date <= end);
        &self.bars[lo..hi]
    }

    /// A new series limited to `[start, end]`.
    pub fn restrict(&self, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        PriceSeries {
            ticker: self.ticker.clone(),
            bars: self.range(start, end).to_vec(),
        }
    }

    pub fn adjusted_close_series(&self) -> IndicatorSeries {
        IndicatorSeries {
            indicator_type: IndicatorType::AdjustedClose,
            values: self
                .bars
                .iter()
                .map(|b| IndicatorPoint::defined(b.date, b.adjusted_close))
                .collect(),
        }
    }

    /// Day-over-day percentage change of adjusted close. The first point, and any point
    /// following a zero price, is undefined.
    pub fn percent_change_series(&self) -> IndicatorSeries {
        let values = self
            .bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                if i == 0 || self.bars[i - 1].adjusted_close == 0.0 {
                    return IndicatorPoint::undefined(bar.date);
                }
                let prev = self.bars[i - 1].adjusted_close;
                IndicatorPoint::defined(bar.date, (bar.adjusted_close - prev) / prev * 100.0)
            })
            .collect();

        IndicatorSeries {
            indicator_type: IndicatorType::PercentChange,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn bar(date: NaiveDate, price: f64) -> PriceBar {
        PriceBar {
            date,
            open: price,
            high: price + 1.0,
            low: price - 1.0,
            close: price,
            adjusted_close: price,
            volume: 100,
        }
    }

    fn sample_series() -> PriceSeries {
        PriceSeries::new(
            "SPY",
            vec![
                bar(d(8, 5), 100.0),
                bar(d(8, 6), 102.0),
                bar(d(8, 7), 101.0),
                bar(d(8, 8), 104.0),
                bar(d(8, 9), 105.0),
                bar(d(8, 12), 103.0),
            ],
        )
    }

    #[test]
    fn new_sorts_unordered_bars() {
        let series = PriceSeries::new(
            "SPY",
            vec![bar(d(8, 7), 3.0), bar(d(8, 5), 1.0), bar(d(8, 6), 2.0)],
        );
        let dates: Vec<NaiveDate> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![d(8, 5), d(8, 6), d(8, 7)]);
    }

    #[test]
    fn new_later_duplicate_wins() {
        let series = PriceSeries::new(
            "SPY",
            vec![bar(d(8, 5), 1.0), bar(d(8, 6), 2.0), bar(d(8, 5), 9.0)],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(d(8, 5)).unwrap().adjusted_close, 9.0);
    }

    #[test]
    fn get_exact_date() {
        let series = sample_series();
        assert_eq!(series.get(d(8, 8)).unwrap().adjusted_close, 104.0);
    }

    #[test]
    fn get_missing_date_is_not_found() {
        let series = sample_series();
        let err = series.get(d(8, 10)).unwrap_err();
        assert!(matches!(
            err,
            TradeTrackError::NotFound { ref ticker, date } if ticker == "SPY" && date == d(8, 10)
        ));
    }

    #[test]
    fn range_is_inclusive() {
        let series = sample_series();
        let bars = series.range(d(8, 6), d(8, 9));
        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0].date, d(8, 6));
        assert_eq!(bars[3].date, d(8, 9));
    }

    #[test]
    fn range_outside_or_inverted_is_empty() {
        let series = sample_series();
        assert!(series.range(d(9, 1), d(9, 30)).is_empty());
        assert!(series.range(d(8, 9), d(8, 6)).is_empty());
    }

    #[test]
    fn restrict_builds_new_series() {
        let series = sample_series();
        let window = series.restrict(d(8, 7), d(8, 31));
        assert_eq!(window.len(), 4);
        assert_eq!(window.ticker(), "SPY");
        assert_eq!(series.len(), 6);
    }

    #[test]
    fn latest_is_last_bar() {
        let series = sample_series();
        assert_eq!(series.latest().unwrap().date, d(8, 12));
        assert!(PriceSeries::new("X", vec![]).latest().is_none());
    }

    #[test]
    fn nearest_on_or_before_within_tolerance() {
        let series = sample_series();
        // Saturday 2024-08-10 -> Friday 2024-08-09
        assert_eq!(series.nearest_on_or_before(d(8, 10), 3).unwrap().date, d(8, 9));
        assert_eq!(series.nearest_on_or_before(d(8, 8), 0).unwrap().date, d(8, 8));
    }

    #[test]
    fn nearest_on_or_before_beyond_tolerance() {
        let series = sample_series();
        assert!(series.nearest_on_or_before(d(8, 11), 1).is_none());
        assert!(series.nearest_on_or_before(d(8, 1), 30).is_none());
    }

    #[test]
    fn percent_change_series() {
        let series = sample_series();
        let pct = series.percent_change_series();
        assert_eq!(pct.indicator_type, IndicatorType::PercentChange);
        assert!(!pct.values[0].is_defined());
        assert_relative_eq!(pct.values[1].value.unwrap(), 2.0);
        assert_relative_eq!(pct.values[2].value.unwrap(), -100.0 / 102.0);
    }

    #[test]
    fn adjusted_close_series_is_fully_defined() {
        let series = sample_series();
        let adj = series.adjusted_close_series();
        assert_eq!(adj.defined_count(), series.len());
    }
}
