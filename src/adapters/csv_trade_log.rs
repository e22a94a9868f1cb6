//! CSV trade log adapter.
//!
//! One trade per row with header `asset,date,action,amount_usd`. Row order is preserved.

use crate::domain::error::TradeTrackError;
use crate::domain::trade::Trade;
use crate::ports::trade_port::TradeLogPort;
use std::path::PathBuf;

pub struct CsvTradeLog {
    path: PathBuf,
}

impl CsvTradeLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TradeLogPort for CsvTradeLog {
    fn load_trades(&self) -> Result<Vec<Trade>, TradeTrackError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| TradeTrackError::Data {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })?;

        let mut trades = Vec::new();
        for (i, result) in rdr.deserialize::<Trade>().enumerate() {
            let trade = result.map_err(|e| TradeTrackError::Data {
                reason: format!("trade log row {}: {}", i + 1, e),
            })?;
            if !(trade.amount_usd > 0.0) {
                return Err(TradeTrackError::Data {
                    reason: format!(
                        "trade log row {}: amount_usd must be positive, got {}",
                        i + 1,
                        trade.amount_usd
                    ),
                });
            }
            trades.push(trade);
        }
        Ok(trades)
    }
}
