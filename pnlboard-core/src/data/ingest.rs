//! CSV ingest for PNL and trade-history uploads.
//!
//! Both readers validate the header row against [`FileSchema`] before
//! touching any data. The PNL reader fills blank numeric cells with 0 and
//! records a [`DataWarning`] for each; the trade-history reader keeps blanks
//! as `None` so incomplete rows can be filtered later. `NaN` counts as blank;
//! infinite values are rejected in both files.

use std::fmt;
use std::io::Read;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::schema::{FileSchema, SchemaError};
use crate::domain::{PnlRow, PnlSeries, SeriesError, TradeHistory, TradeRecord, TradeStatus};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error("row {row}: missing value in column `{column}`")]
    MissingValue { row: usize, column: &'static str },

    #[error("row {row}: `{value}` in column `{column}` is not a finite number")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: `{value}` in column `{column}` is not a date")]
    InvalidDate {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Non-fatal data quality note produced during ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataWarning {
    pub row: usize,
    pub column: String,
    pub message: String,
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, `{}`: {}", self.row, self.column, self.message)
    }
}

/// Parsed data plus the warnings raised while reading it.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub data: T,
    pub warnings: Vec<DataWarning>,
}

const PNL_NUMERIC: [&str; 5] = [
    "cash",
    "equity_exposure",
    "total_value",
    "cumulative_pnl",
    "daily pnl returns",
];

/// Read a PNL CSV.
pub fn read_pnl_csv<R: Read>(reader: R) -> Result<Ingested<PnlSeries>, IngestError> {
    let mut rdr = csv_reader(reader);
    FileSchema::Pnl.validate(rdr.headers()?.iter())?;

    let mut rows = Vec::new();
    let mut warnings = Vec::new();

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let date_raw = record.get(0).unwrap_or("");
        let date = parse_date(row, "Date", date_raw)?.ok_or(IngestError::MissingValue {
            row,
            column: "Date",
        })?;

        let mut values = [0.0_f64; 5];
        for (slot, (idx, column)) in values.iter_mut().zip(PNL_NUMERIC.iter().copied().enumerate()) {
            match parse_number(row, column, record.get(idx + 1).unwrap_or(""))? {
                Some(v) => *slot = v,
                None => {
                    tracing::debug!(row, column, "blank PNL cell filled with 0");
                    warnings.push(DataWarning {
                        row,
                        column: column.to_string(),
                        message: "blank value filled with 0".into(),
                    });
                }
            }
        }

        rows.push(PnlRow {
            date,
            cash: values[0],
            equity_exposure: values[1],
            total_value: values[2],
            cumulative_pnl: values[3],
            daily_return: values[4],
        });
    }

    let series = PnlSeries::new(rows)?;
    if !warnings.is_empty() {
        tracing::warn!(
            filled = warnings.len(),
            rows = series.len(),
            "PNL upload contained blank cells"
        );
    }
    Ok(Ingested {
        data: series,
        warnings,
    })
}

/// Read a trade-history CSV. Blank cells become `None`; malformed ones fail.
pub fn read_trade_history_csv<R: Read>(reader: R) -> Result<Ingested<TradeHistory>, IngestError> {
    let mut rdr = csv_reader(reader);
    FileSchema::TradeHistory.validate(rdr.headers()?.iter())?;

    let mut trades = Vec::new();
    let mut warnings = Vec::new();

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let trade = TradeRecord::new(
            non_blank(field(0)).map(str::to_string),
            parse_number(row, "Shares With Sign", field(1))?,
            parse_date(row, "Entry Date", field(2))?,
            parse_number(row, "Entry Price", field(3))?,
            parse_date(row, "Exit Date", field(4))?,
            parse_number(row, "Exit Price", field(5))?,
            non_blank(field(6)).map(TradeStatus::parse),
            parse_number(row, "PnL", field(7))?,
        );

        if !trade.is_complete() {
            let message = if trade.is_closed() {
                "incomplete trade excluded from breakdowns"
            } else {
                "open trade excluded from breakdowns"
            };
            warnings.push(DataWarning {
                row,
                column: String::new(),
                message: message.into(),
            });
        }
        trades.push(trade);
    }

    let history = TradeHistory::new(trades);
    if !warnings.is_empty() {
        tracing::info!(
            incomplete = warnings.len(),
            trades = history.len(),
            "trade history contains incomplete rows"
        );
    }
    Ok(Ingested {
        data: history,
        warnings,
    })
}

/// Parse `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` (time discarded).
pub fn parse_date(
    row: usize,
    column: &'static str,
    raw: &str,
) -> Result<Option<NaiveDate>, IngestError> {
    let Some(s) = non_blank(raw) else {
        return Ok(None);
    };
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Some(d));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(Some(dt.date()));
    }
    Err(IngestError::InvalidDate {
        row,
        column,
        value: s.to_string(),
    })
}

fn parse_number(row: usize, column: &'static str, raw: &str) -> Result<Option<f64>, IngestError> {
    let Some(s) = non_blank(raw) else {
        return Ok(None);
    };
    match s.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(IngestError::InvalidNumber {
            row,
            column,
            value: s.to_string(),
        }),
    }
}

fn non_blank(raw: &str) -> Option<&str> {
    let s = raw.trim();
    (!s.is_empty()).then_some(s)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader)
}
