//! PnlRow and PnlSeries — the daily profit-and-loss time series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One trading day of portfolio state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlRow {
    pub date: NaiveDate,
    pub cash: f64,
    pub equity_exposure: f64,
    pub total_value: f64,
    pub cumulative_pnl: f64,
    /// The `daily pnl returns` column, stored as uploaded.
    pub daily_return: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("duplicate date {date} at row {row}")]
    DuplicateDate { date: NaiveDate, row: usize },

    #[error("date {date} at row {row} is earlier than the previous row ({previous})")]
    OutOfOrder {
        date: NaiveDate,
        previous: NaiveDate,
        row: usize,
    },
}

/// Date-ordered PNL rows with no duplicate dates.
///
/// Every constructor, deserialization included, goes through
/// [`PnlSeries::new`], so accessors can rely on ascending unique dates.
/// Serializes as a plain array of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PnlRow>", into = "Vec<PnlRow>")]
pub struct PnlSeries {
    rows: Vec<PnlRow>,
}

impl TryFrom<Vec<PnlRow>> for PnlSeries {
    type Error = SeriesError;

    fn try_from(rows: Vec<PnlRow>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<PnlSeries> for Vec<PnlRow> {
    fn from(series: PnlSeries) -> Self {
        series.rows
    }
}

impl PnlSeries {
    /// Validate and wrap rows. Row numbers in errors are 1-based.
    pub fn new(rows: Vec<PnlRow>) -> Result<Self, SeriesError> {
        for (i, pair) in rows.windows(2).enumerate() {
            let (prev, cur) = (&pair[0], &pair[1]);
            if cur.date == prev.date {
                return Err(SeriesError::DuplicateDate {
                    date: cur.date,
                    row: i + 2,
                });
            }
            if cur.date < prev.date {
                return Err(SeriesError::OutOfOrder {
                    date: cur.date,
                    previous: prev.date,
                    row: i + 2,
                });
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[PnlRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn total_values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.total_value).collect()
    }

    pub fn cumulative_pnl(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.cumulative_pnl).collect()
    }

    /// Look up a numeric column by its CSV header name.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let pick: fn(&PnlRow) -> f64 = match name {
            "cash" => |r| r.cash,
            "equity_exposure" => |r| r.equity_exposure,
            "total_value" => |r| r.total_value,
            "cumulative_pnl" => |r| r.cumulative_pnl,
            "daily pnl returns" => |r| r.daily_return,
            _ => return None,
        };
        Some(self.rows.iter().map(pick).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: u32, total_value: f64) -> PnlRow {
        PnlRow {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            cash: 0.0,
            equity_exposure: total_value,
            total_value,
            cumulative_pnl: total_value - 1_000_000.0,
            daily_return: 0.0,
        }
    }

    #[test]
    fn accepts_ascending_dates() {
        let series = PnlSeries::new(vec![row(2, 1.0), row(3, 2.0), row(5, 3.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn rejects_duplicate_date() {
        let err = PnlSeries::new(vec![row(2, 1.0), row(3, 2.0), row(3, 3.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::DuplicateDate { row: 3, .. }));
    }

    #[test]
    fn rejects_descending_date() {
        let err = PnlSeries::new(vec![row(4, 1.0), row(3, 2.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::OutOfOrder { row: 2, .. }));
    }

    #[test]
    fn empty_series_is_valid() {
        let series = PnlSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
    }

    #[test]
    fn json_round_trip_keeps_rows() {
        let series = PnlSeries::new(vec![row(2, 10.0), row(3, 20.0)]).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        assert!(json.starts_with('['));
        let back: PnlSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, series);
    }

    #[test]
    fn deserialize_rejects_duplicate_and_descending_dates() {
        let json = |days: &[u32]| {
            let rows: Vec<PnlRow> = days.iter().map(|&d| row(d, 1.0)).collect();
            serde_json::to_string(&rows).unwrap()
        };

        let err = serde_json::from_str::<PnlSeries>(&json(&[3, 3])).unwrap_err();
        assert!(err.to_string().contains("duplicate date 2024-01-03"));

        let err = serde_json::from_str::<PnlSeries>(&json(&[3, 1])).unwrap_err();
        assert!(err.to_string().contains("earlier than the previous row"));
    }

    #[test]
    fn column_lookup_by_header_name() {
        let series = PnlSeries::new(vec![row(2, 10.0), row(3, 20.0)]).unwrap();
        assert_eq!(series.column("total_value"), Some(vec![10.0, 20.0]));
        assert_eq!(series.column("daily pnl returns"), Some(vec![0.0, 0.0]));
        assert_eq!(series.column("Date"), None);
    }
}
