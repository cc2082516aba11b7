//! Dashboard assembly — the data behind every card and chart.
//!
//! A [`Dashboard`] is the complete, render-agnostic result of one upload
//! batch: metric cards, the equity and daily PNL line series, and the two
//! PnL breakdowns. It serializes with a `schema_version` so exported files
//! can be checked on import.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pnlboard_core::data::DataWarning;
use pnlboard_core::metrics::drawdown_curve;
use pnlboard_core::{BreakdownKey, PerformanceSummary, PnlBreakdown, PnlSeries};

use crate::config::DashboardConfig;
use crate::upload::{parse_uploads, ParsedUpload, UploadError, UploadedFile};

/// Current dashboard JSON schema version.
pub const SCHEMA_VERSION: u32 = 1;

pub const CUMULATIVE_RETURN: &str = "Cumulative Return";
pub const SHARPE_RATIO: &str = "Sharpe Ratio";
pub const MAXIMUM_DRAWDOWN: &str = "Maximum Drawdown";

/// How a card renders its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardFormat {
    /// Fraction shown as a percentage (0.1234 → `12.34%` with 2 decimals).
    Percent { decimals: usize },
    Decimal { decimals: usize },
}

impl CardFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            Self::Percent { decimals } => format!("{:.*}%", decimals, value * 100.0),
            Self::Decimal { decimals } => format!("{:.*}", decimals, value),
        }
    }
}

/// A single headline number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    pub title: String,
    pub value: Option<f64>,
    pub format: CardFormat,
}

impl MetricCard {
    pub fn display(&self) -> String {
        match self.value {
            Some(v) => self.format.format(v),
            None => "n/a".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A dated line series, named after the CSV column it plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub y_label: String,
    pub points: Vec<SeriesPoint>,
}

impl ChartSeries {
    fn from_series(series: &PnlSeries, name: &str, y_label: &str, pick: fn(&pnlboard_core::PnlRow) -> f64) -> Self {
        Self {
            name: name.to_string(),
            y_label: y_label.to_string(),
            points: series
                .rows()
                .iter()
                .map(|r| SeriesPoint {
                    date: r.date,
                    value: pick(r),
                })
                .collect(),
        }
    }

    fn from_values(series: &PnlSeries, name: &str, y_label: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            y_label: y_label.to_string(),
            points: series
                .rows()
                .iter()
                .zip(values)
                .map(|(r, value)| SeriesPoint {
                    date: r.date,
                    value,
                })
                .collect(),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Everything the dashboard shows for one upload batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub schema_version: u32,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub fingerprint: String,
    pub pnl_file: String,
    pub trade_history_file: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub trading_days: usize,
    pub config: DashboardConfig,
    pub summary: PerformanceSummary,
    pub cards: Vec<MetricCard>,
    pub equity_curve: ChartSeries,
    pub daily_pnl: ChartSeries,
    /// Fraction below the running peak of `total_value` on each day.
    pub drawdown: ChartSeries,
    pub pnl_by_ticker: PnlBreakdown,
    pub pnl_by_exit_year: PnlBreakdown,
    pub warnings: Vec<DataWarning>,
}

impl Dashboard {
    pub fn build(upload: &ParsedUpload, config: &DashboardConfig) -> Self {
        let series = &upload.pnl;
        let summary = PerformanceSummary::compute(series, &config.metrics_options());

        let (pnl_by_ticker, pnl_by_exit_year) = match &upload.trade_history {
            Some(history) => (
                PnlBreakdown::compute(history, BreakdownKey::Ticker),
                PnlBreakdown::compute(history, BreakdownKey::ExitYear),
            ),
            None => (
                PnlBreakdown::empty(BreakdownKey::Ticker),
                PnlBreakdown::empty(BreakdownKey::ExitYear),
            ),
        };

        tracing::info!(
            title = %upload.title,
            days = series.len(),
            sharpe = ?summary.sharpe,
            max_drawdown = summary.max_drawdown,
            "dashboard built"
        );

        Self {
            schema_version: SCHEMA_VERSION,
            title: upload.title.clone(),
            generated_at: Utc::now(),
            fingerprint: upload.fingerprint.clone(),
            pnl_file: upload.pnl_file.clone(),
            trade_history_file: upload.trade_history_file.clone(),
            start_date: series.first_date(),
            end_date: series.last_date(),
            trading_days: series.len(),
            config: config.clone(),
            cards: cards_for(&summary),
            summary,
            equity_curve: ChartSeries::from_series(series, "total_value", "Equity", |r| r.total_value),
            daily_pnl: ChartSeries::from_series(
                series,
                "daily pnl returns",
                "PNL Returns",
                |r| r.daily_return,
            ),
            drawdown: ChartSeries::from_values(
                series,
                "drawdown",
                "Drawdown",
                drawdown_curve(&series.total_values()),
            ),
            pnl_by_ticker,
            pnl_by_exit_year,
            warnings: upload.warnings.clone(),
        }
    }

    pub fn card(&self, title: &str) -> Option<&MetricCard> {
        self.cards.iter().find(|c| c.title == title)
    }

    pub fn breakdown(&self, key: BreakdownKey) -> &PnlBreakdown {
        match key {
            BreakdownKey::Ticker => &self.pnl_by_ticker,
            BreakdownKey::ExitYear => &self.pnl_by_exit_year,
        }
    }
}

fn cards_for(summary: &PerformanceSummary) -> Vec<MetricCard> {
    vec![
        MetricCard {
            title: CUMULATIVE_RETURN.to_string(),
            value: Some(summary.cumulative_return),
            format: CardFormat::Percent { decimals: 0 },
        },
        MetricCard {
            title: SHARPE_RATIO.to_string(),
            value: summary.sharpe,
            format: CardFormat::Decimal { decimals: 4 },
        },
        MetricCard {
            title: MAXIMUM_DRAWDOWN.to_string(),
            value: Some(summary.max_drawdown),
            format: CardFormat::Percent { decimals: 4 },
        },
    ]
}

/// Parse an upload batch and build its dashboard.
pub fn build_dashboard(
    files: &[UploadedFile],
    config: &DashboardConfig,
) -> Result<Dashboard, UploadError> {
    let upload = parse_uploads(files)?;
    Ok(Dashboard::build(&upload, config))
}
