//! TradeRecord — one row of an uploaded trade history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a trade as labelled in the upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    Open,
    Closed,
    /// Any label other than open/closed, kept verbatim.
    Other(String),
}

impl TradeStatus {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "closed" => Self::Closed,
            _ => Self::Other(label.trim().to_string()),
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("Open"),
            Self::Closed => f.write_str("Closed"),
            Self::Other(label) => f.write_str(label),
        }
    }
}

/// A trade as uploaded. Open trades usually lack exit fields, so anything
/// the upload may leave blank is an `Option`.
///
/// Fields are private; a record is read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    ticker: Option<String>,
    shares: Option<f64>,
    entry_date: Option<NaiveDate>,
    entry_price: Option<f64>,
    exit_date: Option<NaiveDate>,
    exit_price: Option<f64>,
    status: Option<TradeStatus>,
    pnl: Option<f64>,
}

impl TradeRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticker: Option<String>,
        shares: Option<f64>,
        entry_date: Option<NaiveDate>,
        entry_price: Option<f64>,
        exit_date: Option<NaiveDate>,
        exit_price: Option<f64>,
        status: Option<TradeStatus>,
        pnl: Option<f64>,
    ) -> Self {
        Self {
            ticker,
            shares,
            entry_date,
            entry_price,
            exit_date,
            exit_price,
            status,
            pnl,
        }
    }

    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    /// Signed share count: positive long, negative short.
    pub fn shares(&self) -> Option<f64> {
        self.shares
    }

    pub fn entry_date(&self) -> Option<NaiveDate> {
        self.entry_date
    }

    pub fn entry_price(&self) -> Option<f64> {
        self.entry_price
    }

    pub fn exit_date(&self) -> Option<NaiveDate> {
        self.exit_date
    }

    pub fn exit_price(&self) -> Option<f64> {
        self.exit_price
    }

    pub fn status(&self) -> Option<&TradeStatus> {
        self.status.as_ref()
    }

    /// Realized PnL.
    pub fn pnl(&self) -> Option<f64> {
        self.pnl
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.status, Some(TradeStatus::Closed))
    }

    /// True when every column was present in the upload.
    pub fn is_complete(&self) -> bool {
        self.ticker.is_some()
            && self.shares.is_some()
            && self.entry_date.is_some()
            && self.entry_price.is_some()
            && self.exit_date.is_some()
            && self.exit_price.is_some()
            && self.status.is_some()
            && self.pnl.is_some()
    }
}

/// All trades from one trade-history upload, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeHistory {
    trades: Vec<TradeRecord>,
}

impl TradeHistory {
    pub fn new(trades: Vec<TradeRecord>) -> Self {
        Self { trades }
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn complete(&self) -> impl Iterator<Item = &TradeRecord> {
        self.trades.iter().filter(|t| t.is_complete())
    }
}
