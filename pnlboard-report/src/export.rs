//! Reporting and export — JSON, CSV, and Markdown artifacts for a dashboard.
//!
//! Provides three export formats:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: line series and breakdowns for external charting tools
//! - **Markdown**: human-readable single-dashboard report
//!
//! Persisted JSON carries a `schema_version` field. Newer versions are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use pnlboard_core::PnlBreakdown;

use crate::dashboard::{ChartSeries, Dashboard, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `Dashboard` to pretty JSON.
pub fn export_json(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).context("failed to serialize Dashboard to JSON")
}

/// Deserialize a `Dashboard` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<Dashboard> {
    let dashboard: Dashboard =
        serde_json::from_str(json).context("failed to deserialize Dashboard from JSON")?;
    if dashboard.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            dashboard.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(dashboard)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a line series as `Date,<series name>` CSV.
pub fn export_series_csv(series: &ChartSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Date", series.name.as_str()])?;
    for p in &series.points {
        wtr.write_record([p.date.to_string(), p.value.to_string()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export a breakdown as `<key label>,PnL,Trades` CSV.
pub fn export_breakdown_csv(breakdown: &PnlBreakdown) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([breakdown.key.label(), "PnL", "Trades"])?;
    for bar in &breakdown.bars {
        wtr.write_record([bar.key.clone(), format!("{:.2}", bar.pnl), bar.trades.to_string()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one dashboard.
///
/// Creates a directory named `{stem}_{timestamp}/` under `output_dir`, where
/// `stem` is the PNL file name without extension, containing:
/// - `dashboard.json` — the full `Dashboard`
/// - `report.md` — Markdown report
/// - `equity.csv`, `daily_pnl.csv`, `drawdown.csv` — line series
/// - `pnl_by_ticker.csv`, `pnl_by_year.csv` — breakdowns
///
/// Returns the path to the created directory.
pub fn save_artifacts(dashboard: &Dashboard, output_dir: &Path) -> Result<PathBuf> {
    let stem = Path::new(&dashboard.pnl_file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dashboard".to_string());
    let dirname = format!(
        "{}_{}",
        stem,
        dashboard.generated_at.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let files = [
        ("dashboard.json", export_json(dashboard)?),
        ("report.md", generate_report(dashboard)),
        ("equity.csv", export_series_csv(&dashboard.equity_curve)?),
        ("daily_pnl.csv", export_series_csv(&dashboard.daily_pnl)?),
        ("drawdown.csv", export_series_csv(&dashboard.drawdown)?),
        ("pnl_by_ticker.csv", export_breakdown_csv(&dashboard.pnl_by_ticker)?),
        ("pnl_by_year.csv", export_breakdown_csv(&dashboard.pnl_by_exit_year)?),
    ];
    for (name, content) in &files {
        let path = run_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    tracing::info!(dir = %run_dir.display(), files = files.len(), "artifacts saved");
    Ok(run_dir)
}

/// Load a `Dashboard` from an artifact directory's dashboard.json.
pub fn load_artifacts(dir: &Path) -> Result<Dashboard> {
    let path = dir.join("dashboard.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for one dashboard.
pub fn generate_report(dashboard: &Dashboard) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str(&format!("# File Name: {}\n\n", dashboard.title));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| PNL File | {} |\n", dashboard.pnl_file));
    if let Some(name) = &dashboard.trade_history_file {
        md.push_str(&format!("| Trade History File | {name} |\n"));
    }
    match (dashboard.start_date, dashboard.end_date) {
        (Some(start), Some(end)) => {
            md.push_str(&format!("| Period | {start} to {end} |\n"));
        }
        _ => md.push_str("| Period | (empty) |\n"),
    }
    md.push_str(&format!("| Trading Days | {} |\n", dashboard.trading_days));
    md.push_str(&format!(
        "| Initial Capital | ${:.0} |\n",
        dashboard.config.initial_capital
    ));
    md.push_str(&format!("| Fingerprint | {} |\n", dashboard.fingerprint));
    md.push('\n');

    md.push_str("## Performance Metrics\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | ---: |\n");
    for card in &dashboard.cards {
        md.push_str(&format!("| {} | {} |\n", card.title, card.display()));
    }
    md.push('\n');

    md.push_str("## PNL Breakdown\n\n");
    for breakdown in [&dashboard.pnl_by_ticker, &dashboard.pnl_by_exit_year] {
        md.push_str(&format!("### By {}\n\n", breakdown.key.label()));
        if breakdown.is_empty() {
            md.push_str("No complete trades.\n\n");
            continue;
        }
        md.push_str(&format!("| {} | PnL | Trades |\n", breakdown.key.label()));
        md.push_str("| --- | ---: | ---: |\n");
        for bar in &breakdown.bars {
            md.push_str(&format!("| {} | {:.2} | {} |\n", bar.key, bar.pnl, bar.trades));
        }
        md.push('\n');
    }

    if !dashboard.warnings.is_empty() {
        md.push_str("## Data Quality\n\n");
        for warn in &dashboard.warnings {
            md.push_str(&format!("- {warn}\n"));
        }
        md.push('\n');
    }

    md
}
