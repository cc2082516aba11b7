//! PnlBoard Report — upload routing, dashboard assembly, configuration, export.
//!
//! This crate builds on `pnlboard-core` to provide:
//! - Classification and parsing of an upload batch (PNL + trade history)
//! - User-facing error messages for rejected uploads
//! - Dashboard assembly: metric cards, line series, PnL breakdowns
//! - TOML configuration for initial capital and Sharpe annualization
//! - JSON, CSV, and Markdown export with artifact bundles

pub mod config;
pub mod dashboard;
pub mod export;
pub mod upload;

pub use config::{ConfigError, DashboardConfig};
pub use dashboard::{
    build_dashboard, CardFormat, ChartSeries, Dashboard, MetricCard, SeriesPoint, SCHEMA_VERSION,
};
pub use export::{export_json, generate_report, import_json, load_artifacts, save_artifacts};
pub use upload::{check_header, parse_uploads, FileKind, ParsedUpload, UploadError, UploadedFile, UserMessage};
