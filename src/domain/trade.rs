//! Trade events, assets, and resolved trades.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    #[serde(alias = "Buy", alias = "BUY")]
    Buy,
    #[serde(alias = "Sell", alias = "SELL")]
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "Buy"),
            TradeAction::Sell => write!(f, "Sell"),
        }
    }
}

impl FromStr for TradeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TradeAction::Buy),
            "sell" => Ok(TradeAction::Sell),
            other => Err(format!("unknown trade action '{}'", other)),
        }
    }
}

/// A buy or sell of `amount_usd` worth of `asset` on `date`, as recorded in the trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub asset: String,
    pub date: NaiveDate,
    pub action: TradeAction,
    pub amount_usd: f64,
}

/// A trade paired with the price it was matched to. `price_date` differs from
/// `trade.date` only under nearest-prior matching.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTrade {
    pub trade: Trade,
    pub trade_price: f64,
    pub price_date: NaiveDate,
}

/// Display name used in trade logs mapped to the symbol price data is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub ticker: String,
}

impl Asset {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

/// Trades for `asset`, in their original order.
pub fn trades_for<'a>(trades: &'a [Trade], asset: &str) -> Vec<&'a Trade> {
    trades.iter().filter(|t| t.asset == asset).collect()
}
