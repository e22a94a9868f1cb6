//! Daily price bar and dividend event representation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: u64,
}

/// Per-share cash dividend paid on `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Dividends paid on or after `start`, in date order.
pub fn dividends_since(events: &[DividendEvent], start: NaiveDate) -> Vec<DividendEvent> {
    let mut filtered: Vec<DividendEvent> =
        events.iter().filter(|d| d.date >= start).cloned().collect();
    filtered.sort_by_key(|d| d.date);
    filtered
}
