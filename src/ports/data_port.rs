//! Price data access port trait.

use crate::domain::error::TradeTrackError;
use crate::domain::price_bar::{DividendEvent, PriceBar};
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Raw bars for `ticker` within `[start_date, end_date]`, in any order.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, TradeTrackError>;

    /// Dividend history; an instrument without dividends yields an empty list.
    fn fetch_dividends(&self, ticker: &str) -> Result<Vec<DividendEvent>, TradeTrackError>;

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TradeTrackError>;
}
