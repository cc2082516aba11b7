//! PnlBoard Core — domain types, upload ingest, performance metrics, breakdowns.
//!
//! This crate holds everything that does not depend on how uploads arrive
//! or how results are shown:
//! - Domain types (PNL series, trade records, trade history)
//! - Fixed upload schemas and CSV ingest with header validation
//! - Pure performance metrics (Sharpe ratio, max drawdown, cumulative return)
//! - Realized PnL breakdowns by ticker and exit year

pub mod breakdown;
pub mod data;
pub mod domain;
pub mod metrics;

pub use breakdown::{BreakdownBar, BreakdownKey, PnlBreakdown};
pub use data::{read_pnl_csv, read_trade_history_csv, DataWarning, FileSchema, IngestError};
pub use domain::{PnlRow, PnlSeries, TradeHistory, TradeRecord, TradeStatus};
pub use metrics::{MetricError, MetricsOptions, PerformanceSummary};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public types can cross threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PnlSeries>();
        require_sync::<PnlSeries>();
        require_send::<TradeHistory>();
        require_sync::<TradeHistory>();
        require_send::<PerformanceSummary>();
        require_sync::<PerformanceSummary>();
        require_send::<PnlBreakdown>();
        require_sync::<PnlBreakdown>();
        require_send::<IngestError>();
        require_sync::<IngestError>();
    }
}
