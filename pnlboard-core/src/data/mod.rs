//! Upload schemas and CSV ingest

pub mod ingest;
pub mod schema;

pub use ingest::{
    parse_date, read_pnl_csv, read_trade_history_csv, DataWarning, IngestError, Ingested,
};
pub use schema::{FileSchema, SchemaError, PNL_HEADER, TRADE_HISTORY_HEADER};
