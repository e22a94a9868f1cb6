#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use tradetrack::domain::calendar::is_business_day;
use tradetrack::domain::error::TradeTrackError;
pub use tradetrack::domain::price_bar::{DividendEvent, PriceBar};
use tradetrack::domain::trade::{Trade, TradeAction};
use tradetrack::ports::data_port::PriceDataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub dividends: HashMap<String, Vec<DividendEvent>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            dividends: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_dividends(mut self, ticker: &str, events: Vec<DividendEvent>) -> Self {
        self.dividends.insert(ticker.to_string(), events);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, TradeTrackError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(TradeTrackError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_dividends(&self, ticker: &str) -> Result<Vec<DividendEvent>, TradeTrackError> {
        Ok(self.dividends.get(ticker).cloned().unwrap_or_default())
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TradeTrackError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(TradeTrackError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(ticker) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date_str: &str, adjusted_close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: adjusted_close - 1.0,
        high: adjusted_close + 1.0,
        low: adjusted_close - 2.0,
        close: adjusted_close,
        adjusted_close,
        volume: 1000,
    }
}

/// `count` weekday bars from `start`, priced by `price(i)`.
pub fn business_day_bars(
    start: NaiveDate,
    count: usize,
    price: impl Fn(usize) -> f64,
) -> Vec<PriceBar> {
    let mut bars = Vec::with_capacity(count);
    let mut d = start;
    while bars.len() < count {
        if is_business_day(d) {
            let p = price(bars.len());
            bars.push(PriceBar {
                date: d,
                open: p,
                high: p + 1.0,
                low: p - 1.0,
                close: p,
                adjusted_close: p,
                volume: 1000,
            });
        }
        d += Duration::days(1);
    }
    bars
}

pub fn generate_bars(start: NaiveDate, count: usize, start_price: f64) -> Vec<PriceBar> {
    business_day_bars(start, count, |i| {
        start_price + i as f64 * 0.5 + (i as f64 * 0.7).sin() * 3.0
    })
}

pub fn trade(asset: &str, date_str: &str, action: TradeAction, amount_usd: f64) -> Trade {
    Trade {
        asset: asset.to_string(),
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        action,
        amount_usd,
    }
}

/// Price CSV body with the header the CSV adapter expects.
pub fn price_csv(bars: &[PriceBar]) -> String {
    let mut out = String::from("date,open,high,low,close,adj_close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.adjusted_close, b.volume
        ));
    }
    out
}
