//! Fixed CSV headers accepted for uploads.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const PNL_HEADER: &str =
    "Date,cash,equity_exposure,total_value,cumulative_pnl,daily pnl returns";

pub const TRADE_HISTORY_HEADER: &str =
    "Ticker,Shares With Sign,Entry Date,Entry Price,Exit Date,Exit Price,Status,PnL";

/// The two upload schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileSchema {
    Pnl,
    TradeHistory,
}

impl FileSchema {
    pub fn header(self) -> &'static str {
        match self {
            Self::Pnl => PNL_HEADER,
            Self::TradeHistory => TRADE_HISTORY_HEADER,
        }
    }

    pub fn columns(self) -> Vec<&'static str> {
        self.header().split(',').collect()
    }

    /// Exact, ordered comparison of a header row against this schema.
    ///
    /// Fields are trimmed and a leading UTF-8 BOM is ignored; nothing else
    /// is normalised (case and column order matter).
    pub fn validate<'a, I>(self, header: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let found: Vec<String> = header
            .into_iter()
            .enumerate()
            .map(|(i, field)| {
                let field = if i == 0 {
                    field.trim_start_matches('\u{feff}')
                } else {
                    field
                };
                field.trim().to_string()
            })
            .collect();

        if found.iter().all(|f| f.is_empty()) {
            return Err(SchemaError::MissingHeader { schema: self });
        }

        let expected = self.columns();
        if found.len() != expected.len() || found.iter().zip(&expected).any(|(f, e)| f != e) {
            return Err(SchemaError::HeaderMismatch {
                schema: self,
                expected: self.header().to_string(),
                found: found.join(","),
            });
        }
        Ok(())
    }
}

impl fmt::Display for FileSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pnl => f.write_str("PNL"),
            Self::TradeHistory => f.write_str("Trade History"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("{schema} file has no header row")]
    MissingHeader { schema: FileSchema },

    #[error("{schema} header mismatch: expected `{expected}`, found `{found}`")]
    HeaderMismatch {
        schema: FileSchema,
        expected: String,
        found: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pnl_schema_has_six_columns() {
        assert_eq!(FileSchema::Pnl.columns().len(), 6);
        assert_eq!(FileSchema::Pnl.columns()[5], "daily pnl returns");
    }

    #[test]
    fn trade_history_schema_has_eight_columns() {
        assert_eq!(FileSchema::TradeHistory.columns().len(), 8);
        assert_eq!(FileSchema::TradeHistory.columns()[0], "Ticker");
    }

    #[test]
    fn exact_header_is_accepted() {
        assert!(FileSchema::Pnl.validate(PNL_HEADER.split(',')).is_ok());
        assert!(FileSchema::TradeHistory
            .validate(TRADE_HISTORY_HEADER.split(','))
            .is_ok());
    }

    #[test]
    fn bom_and_padding_are_ignored() {
        let header = "\u{feff}Date, cash,equity_exposure ,total_value,cumulative_pnl,daily pnl returns";
        assert!(FileSchema::Pnl.validate(header.split(',')).is_ok());
    }

    #[test]
    fn renamed_column_is_rejected() {
        let header = "Date,cash,equity_exposure,total_value,cumulative_pnl,daily_return";
        let err = FileSchema::Pnl.validate(header.split(',')).unwrap_err();
        assert!(matches!(err, SchemaError::HeaderMismatch { schema: FileSchema::Pnl, .. }));
    }

    #[test]
    fn reordered_columns_are_rejected() {
        let header = "cash,Date,equity_exposure,total_value,cumulative_pnl,daily pnl returns";
        assert!(FileSchema::Pnl.validate(header.split(',')).is_err());
    }

    #[test]
    fn extra_column_is_rejected() {
        let header = format!("{TRADE_HISTORY_HEADER},Notes");
        assert!(FileSchema::TradeHistory.validate(header.split(',')).is_err());
    }

    #[test]
    fn other_schema_header_is_rejected() {
        assert!(FileSchema::Pnl
            .validate(TRADE_HISTORY_HEADER.split(','))
            .is_err());
    }

    #[test]
    fn empty_header_is_missing() {
        let err = FileSchema::Pnl.validate(std::iter::empty::<&str>()).unwrap_err();
        assert_eq!(err, SchemaError::MissingHeader { schema: FileSchema::Pnl });
    }
}
