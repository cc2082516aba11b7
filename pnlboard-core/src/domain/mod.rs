//! Domain types for PnlBoard

pub mod pnl;
pub mod trade;

pub use pnl::{PnlRow, PnlSeries, SeriesError};
pub use trade::{TradeHistory, TradeRecord, TradeStatus};
