//! PnlBoard CLI — build dashboards from PNL and trade-history CSV files.
//!
//! Commands:
//! - `report` — parse an upload batch, print the dashboard, optionally save artifacts
//! - `check` — validate file headers without reading data rows
//! - `metrics` — Sharpe ratio and max drawdown of one numeric PNL column

mod obs;

use obs::LogFormat;

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pnlboard_core::data::read_pnl_csv;
use pnlboard_core::metrics::{max_drawdown, sharpe_ratio, TRADING_DAYS_PER_YEAR};
use pnlboard_core::PnlBreakdown;
use pnlboard_report::{
    build_dashboard, check_header, export_json, generate_report, save_artifacts, Dashboard,
    DashboardConfig, FileKind, UploadError, UploadedFile,
};

/// Column whose values are already per-period returns.
const RETURNS_COLUMN: &str = "daily pnl returns";

#[derive(Parser)]
#[command(
    name = "pnlboard",
    about = "PnlBoard CLI — trading performance dashboards from PNL exports"
)]
struct Cli {
    /// Log filter (e.g. info, debug, pnlboard_core=trace). PNLBOARD_LOG overrides it.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dashboard for a PNL file and an optional trade history.
    Report {
        /// Uploaded files, classified by name (`*pnl*.csv`, `*trade_history*.csv`).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format written to stdout.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Save the artifact bundle under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Validate file headers only.
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Sharpe ratio and max drawdown of one column of a PNL file.
    Metrics {
        /// PNL CSV file.
        file: PathBuf,

        /// Column name as it appears in the header.
        #[arg(long, default_value = "total_value")]
        column: String,

        /// Periods per year for the Sharpe ratio; 0 reports the raw ratio.
        #[arg(long, default_value_t = TRADING_DAYS_PER_YEAR)]
        periods: f64,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    obs::init_tracing(&cli.log_level, cli.log_format)?;

    match cli.command {
        Commands::Report {
            files,
            config,
            format,
            output_dir,
        } => run_report(&files, config.as_deref(), format, output_dir.as_deref()),
        Commands::Check { files } => run_check(&files),
        Commands::Metrics {
            file,
            column,
            periods,
        } => run_metrics(&file, &column, periods),
    }
}

fn load_files(paths: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    paths
        .iter()
        .map(|p| {
            UploadedFile::from_path(p).with_context(|| format!("failed to read {}", p.display()))
        })
        .collect()
}

fn exit_with(err: &UploadError) -> ! {
    tracing::error!(error = %err, "upload rejected");
    eprintln!("{}", err.user_message());
    std::process::exit(1);
}

fn run_report(
    paths: &[PathBuf],
    config_path: Option<&Path>,
    format: OutputFormat,
    output_dir: Option<&Path>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    let files = load_files(paths)?;

    let dashboard = match build_dashboard(&files, &config) {
        Ok(d) => d,
        Err(e) => exit_with(&e),
    };

    match format {
        OutputFormat::Text => print_summary(&dashboard),
        OutputFormat::Json => println!("{}", export_json(&dashboard)?),
        OutputFormat::Markdown => print!("{}", generate_report(&dashboard)),
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&dashboard, dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_check(paths: &[PathBuf]) -> Result<()> {
    let files = load_files(paths)?;
    let mut failed = 0;
    let mut saw_pnl = false;

    for file in &files {
        match check_header(file) {
            Ok(FileKind::Unrecognized) => println!("SKIP  {}", file.name),
            Ok(kind) => {
                saw_pnl |= kind == FileKind::Pnl;
                println!("OK    {} ({})", file.name, kind_label(kind));
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(file = %file.name, error = %e, "header check failed");
                println!("FAIL  {}: {}", file.name, e.user_message());
            }
        }
    }

    if !saw_pnl && failed == 0 {
        exit_with(&UploadError::MissingPnlFile);
    }
    if failed > 0 {
        eprintln!("{failed} file(s) failed the header check");
        std::process::exit(1);
    }
    Ok(())
}

fn kind_label(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Pnl => "PNL",
        FileKind::TradeHistory => "Trade History",
        FileKind::Spreadsheet => "Spreadsheet",
        FileKind::Unrecognized => "Unrecognized",
    }
}

fn run_metrics(path: &Path, column: &str, periods: f64) -> Result<()> {
    if !(periods.is_finite() && periods >= 0.0) {
        bail!("--periods must be >= 0, got {periods}");
    }
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let ingested = read_pnl_csv(file)
        .with_context(|| format!("failed to read PNL file {}", path.display()))?;
    let series = ingested.data;

    let Some(values) = series.column(column) else {
        bail!("unknown numeric column '{column}'");
    };
    let returns = column_returns(column, &values);
    let annualization = (periods > 0.0).then_some(periods);

    println!();
    println!("=== {} ===", column);
    println!("Observations:   {}", values.len());
    match sharpe_ratio(&returns, annualization) {
        Ok(s) => println!("Sharpe Ratio:   {s:.4}"),
        Err(e) => println!("Sharpe Ratio:   n/a ({e})"),
    }
    println!("Max Drawdown:   {:.4}%", max_drawdown(&values) * 100.0);
    println!();
    Ok(())
}

/// Per-period returns for a column: the values themselves for the returns
/// column, otherwise the simple change between consecutive values.
fn column_returns(column: &str, values: &[f64]) -> Vec<f64> {
    if column == RETURNS_COLUMN {
        return values.to_vec();
    }
    values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

fn print_summary(dashboard: &Dashboard) {
    println!();
    println!("=== File Name: {} ===", dashboard.title);
    println!("PNL File:       {}", dashboard.pnl_file);
    if let Some(name) = &dashboard.trade_history_file {
        println!("Trade History:  {name}");
    }
    match (dashboard.start_date, dashboard.end_date) {
        (Some(start), Some(end)) => println!("Period:         {start} to {end}"),
        _ => println!("Period:         (empty)"),
    }
    println!("Trading Days:   {}", dashboard.trading_days);
    println!();
    println!("--- Performance ---");
    for card in &dashboard.cards {
        println!("{:<20}{}", format!("{}:", card.title), card.display());
    }
    for breakdown in [&dashboard.pnl_by_ticker, &dashboard.pnl_by_exit_year] {
        print_breakdown(breakdown);
    }
    for warn in &dashboard.warnings {
        println!("WARNING: {warn}");
    }
    println!();
}

fn print_breakdown(breakdown: &PnlBreakdown) {
    println!();
    println!("--- PnL by {} ---", breakdown.key.label());
    if breakdown.is_empty() {
        println!("(no complete trades)");
        return;
    }
    println!("{:<10} {:>14} {:>7}", breakdown.key.label(), "PnL", "Trades");
    println!("{}", "-".repeat(33));
    for bar in &breakdown.bars {
        println!("{:<10} {:>14.2} {:>7}", bar.key, bar.pnl, bar.trades);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_column_is_used_as_is() {
        let r = column_returns(RETURNS_COLUMN, &[0.01, -0.02]);
        assert_eq!(r, vec![0.01, -0.02]);
    }

    #[test]
    fn value_columns_become_simple_returns() {
        let r = column_returns("total_value", &[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.1).abs() < 1e-12);
        assert!((r[1] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn zero_values_are_skipped() {
        assert_eq!(column_returns("cash", &[0.0, 5.0]), Vec::<f64>::new());
    }

    #[test]
    fn log_format_defaults_to_text_and_rejects_unknown() {
        let cli = Cli::try_parse_from(["pnlboard", "check", "a_pnl.csv"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Text);
        assert!(Cli::try_parse_from(["pnlboard", "--log-format", "xml", "check", "a_pnl.csv"]).is_err());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pnlboard",
            "metrics",
            "run_pnl.csv",
            "--column",
            "cumulative_pnl",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Metrics { ref column, .. } if column == "cumulative_pnl"));
    }
}
