//! Trade-to-price reconciliation and profit/loss.
//!
//! Each trade is matched to an adjusted close, converted to a share count, and valued
//! against a current price:
//! - buy:  (current - trade_price) * shares, Potential
//! - sell: (trade_price - current) * shares, Realized
//!
//! Trades that cannot be priced are skipped with a warning; they never fail the batch.

use log::warn;
use serde::Serialize;
use std::fmt;

use crate::domain::error::TradeTrackError;
use crate::domain::price_series::PriceSeries;
use crate::domain::trade::{trades_for, ResolvedTrade, Trade, TradeAction};

/// How a trade date is matched to a price bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// The bar on exactly the trade date.
    #[default]
    Exact,
    /// The latest bar on or before the trade date, at most `max_days` calendar days earlier.
    NearestPrior { max_days: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PnlClassification {
    Potential,
    Realized,
}

impl fmt::Display for PnlClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PnlClassification::Potential => write!(f, "Potential"),
            PnlClassification::Realized => write!(f, "Realized"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlRecord {
    pub trade: ResolvedTrade,
    pub current_price: f64,
    pub shares: f64,
    pub profit_or_loss: f64,
    pub classification: PnlClassification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SkipReason {
    NoPriceOnDate,
    InvalidPrice { price: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTrade {
    pub trade: Trade,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub asset: String,
    pub current_price: f64,
    pub records: Vec<PnlRecord>,
    pub skipped: Vec<SkippedTrade>,
}

impl ReconciliationReport {
    pub fn total(&self, classification: PnlClassification) -> f64 {
        self.records
            .iter()
            .filter(|r| r.classification == classification)
            .map(|r| r.profit_or_loss)
            .sum()
    }

    pub fn total_potential(&self) -> f64 {
        self.total(PnlClassification::Potential)
    }

    pub fn total_realized(&self) -> f64 {
        self.total(PnlClassification::Realized)
    }
}

// NaN fails every comparison, so test for the valid range rather than the invalid one.
fn usable_price(price: f64) -> bool {
    price > 0.0 && price.is_finite()
}

fn trade_context(trade: &Trade) -> String {
    format!("{} {} on {}", trade.action, trade.asset, trade.date)
}

/// Match `trade` to a price in `series`. Does not touch the input trade.
pub fn resolve_trade(
    trade: &Trade,
    series: &PriceSeries,
    strategy: MatchStrategy,
) -> Result<ResolvedTrade, TradeTrackError> {
    let bar = match strategy {
        MatchStrategy::Exact => series.get(trade.date)?,
        MatchStrategy::NearestPrior { max_days } => series
            .nearest_on_or_before(trade.date, max_days)
            .ok_or_else(|| TradeTrackError::NotFound {
                ticker: series.ticker().to_string(),
                date: trade.date,
            })?,
    };

    if !usable_price(bar.adjusted_close) {
        return Err(TradeTrackError::InvalidPrice {
            price: bar.adjusted_close,
            context: trade_context(trade),
        });
    }

    Ok(ResolvedTrade {
        trade: trade.clone(),
        trade_price: bar.adjusted_close,
        price_date: bar.date,
    })
}

pub fn profit_or_loss(
    action: TradeAction,
    trade_price: f64,
    current_price: f64,
    shares: f64,
) -> f64 {
    match action {
        TradeAction::Buy => (current_price - trade_price) * shares,
        TradeAction::Sell => (trade_price - current_price) * shares,
    }
}

pub fn compute_pnl(
    resolved: ResolvedTrade,
    current_price: f64,
) -> Result<PnlRecord, TradeTrackError> {
    if !usable_price(resolved.trade_price) {
        return Err(TradeTrackError::InvalidPrice {
            price: resolved.trade_price,
            context: trade_context(&resolved.trade),
        });
    }

    let shares = resolved.trade.amount_usd / resolved.trade_price;
    let pnl = profit_or_loss(
        resolved.trade.action,
        resolved.trade_price,
        current_price,
        shares,
    );
    let classification = match resolved.trade.action {
        TradeAction::Buy => PnlClassification::Potential,
        TradeAction::Sell => PnlClassification::Realized,
    };

    Ok(PnlRecord {
        trade: resolved,
        current_price,
        shares,
        profit_or_loss: pnl,
        classification,
    })
}

/// Reconcile the trades for `asset` against its price series, valuing each at `current_price`.
/// Trades for other assets are ignored; output order follows the input list.
pub fn reconcile(
    asset: &str,
    trades: &[Trade],
    series: &PriceSeries,
    current_price: f64,
    strategy: MatchStrategy,
) -> Result<ReconciliationReport, TradeTrackError> {
    if !usable_price(current_price) {
        return Err(TradeTrackError::InvalidPrice {
            price: current_price,
            context: format!("current price of {}", asset),
        });
    }

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for trade in trades_for(trades, asset) {
        let outcome =
            resolve_trade(trade, series, strategy).and_then(|r| compute_pnl(r, current_price));
        match outcome {
            Ok(record) => records.push(record),
            Err(TradeTrackError::InvalidPrice { price, .. }) => {
                warn!(
                    "skipping trade {}: invalid price {}",
                    trade_context(trade),
                    price
                );
                skipped.push(SkippedTrade {
                    trade: trade.clone(),
                    reason: SkipReason::InvalidPrice { price },
                });
            }
            Err(e) => {
                warn!("skipping trade {}: {}", trade_context(trade), e);
                skipped.push(SkippedTrade {
                    trade: trade.clone(),
                    reason: SkipReason::NoPriceOnDate,
                });
            }
        }
    }

    Ok(ReconciliationReport {
        asset: asset.to_string(),
        current_price,
        records,
        skipped,
    })
}
