//! CSV file price data adapter.
//!
//! Prices live in `<base>/<ticker>.csv` with header
//! `date,open,high,low,close,adj_close,volume` (the provider's `Date,...,Adj Close,Volume`
//! header is accepted too). Dividends, when present, live in `<base>/<ticker>_dividends.csv`
//! with header `date,dividend`.

use crate::domain::error::TradeTrackError;
use crate::domain::price_bar::{DividendEvent, PriceBar};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Adj Close", alias = "adjusted_close")]
    adj_close: f64,
    #[serde(alias = "Volume")]
    volume: u64,
}

#[derive(Debug, Deserialize)]
struct DividendRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Dividends", alias = "amount")]
    dividend: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn price_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn dividend_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}_dividends.csv", ticker))
    }

    fn read_all(&self, ticker: &str) -> Result<Vec<PriceBar>, TradeTrackError> {
        let path = self.price_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| TradeTrackError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();
        for result in rdr.deserialize::<PriceRow>() {
            let row = result.map_err(|e| TradeTrackError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            bars.push(PriceBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                adjusted_close: row.adj_close,
                volume: row.volume,
            });
        }
        debug!("read {} bars from {}", bars.len(), path.display());
        Ok(bars)
    }
}

impl PriceDataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, TradeTrackError> {
        let mut bars: Vec<PriceBar> = self
            .read_all(ticker)?
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect();
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn fetch_dividends(&self, ticker: &str) -> Result<Vec<DividendEvent>, TradeTrackError> {
        let path = self.dividend_path(ticker);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| TradeTrackError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let mut events = Vec::new();
        for result in rdr.deserialize::<DividendRow>() {
            let row = result.map_err(|e| TradeTrackError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            events.push(DividendEvent {
                date: row.date,
                amount: row.dividend,
            });
        }
        events.sort_by_key(|d| d.date);
        Ok(events)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TradeTrackError> {
        if !self.price_path(ticker).exists() {
            return Ok(None);
        }
        let bars = self.read_all(ticker)?;
        let min = bars.iter().map(|b| b.date).min();
        let max = bars.iter().map(|b| b.date).max();
        Ok(min.zip(max).map(|(min, max)| (min, max, bars.len())))
    }
}
