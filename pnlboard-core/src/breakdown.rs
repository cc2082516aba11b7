//! PNL breakdowns — realized PnL summed per ticker or per exit year.
//!
//! Only complete trade records take part; open trades and rows with blank
//! cells are dropped first.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{TradeHistory, TradeRecord};

/// Grouping key for a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakdownKey {
    Ticker,
    ExitYear,
}

impl BreakdownKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ticker => "Ticker",
            Self::ExitYear => "Exit Year",
        }
    }

    fn key_of(self, trade: &TradeRecord) -> Option<String> {
        match self {
            Self::Ticker => trade.ticker().map(str::to_uppercase),
            Self::ExitYear => trade.exit_date().map(|d| d.year().to_string()),
        }
    }
}

impl fmt::Display for BreakdownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One bar of a breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownBar {
    pub key: String,
    pub pnl: f64,
    pub trades: usize,
}

/// Summed PnL per group, sorted by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlBreakdown {
    pub key: BreakdownKey,
    pub bars: Vec<BreakdownBar>,
}

impl PnlBreakdown {
    pub fn compute(history: &TradeHistory, key: BreakdownKey) -> Self {
        let mut groups: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for trade in history.complete() {
            let (Some(group), Some(pnl)) = (key.key_of(trade), trade.pnl()) else {
                continue;
            };
            let entry = groups.entry(group).or_insert((0.0, 0));
            entry.0 += pnl;
            entry.1 += 1;
        }
        Self {
            key,
            bars: groups
                .into_iter()
                .map(|(key, (pnl, trades))| BreakdownBar { key, pnl, trades })
                .collect(),
        }
    }

    pub fn empty(key: BreakdownKey) -> Self {
        Self {
            key,
            bars: Vec::new(),
        }
    }

    pub fn total(&self) -> f64 {
        self.bars.iter().map(|b| b.pnl).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&BreakdownBar> {
        self.bars.iter().find(|b| b.key == key)
    }
}
