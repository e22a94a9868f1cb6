//! Trade log access port trait.

use crate::domain::error::TradeTrackError;
use crate::domain::trade::Trade;

pub trait TradeLogPort {
    /// Every recorded trade, in log order.
    fn load_trades(&self) -> Result<Vec<Trade>, TradeTrackError>;
}
