//! Upload routing — turn a batch of uploaded files into parsed PNL data.
//!
//! Files are classified by name, in order:
//! 1. name contains `csv` and `pnl` → PNL series
//! 2. name contains `csv` and `trade_history` → trade history
//! 3. name contains `xls` (no `csv`) → rejected, spreadsheets are not parsed
//! 4. anything else → ignored with a warning
//!
//! The first failing file ends the batch. A batch without a PNL file fails.

use std::fmt;
use std::path::Path;

use pnlboard_core::data::{read_pnl_csv, read_trade_history_csv, DataWarning, IngestError};
use pnlboard_core::{FileSchema, PnlSeries, TradeHistory};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title shown above schema alerts.
pub const FILE_ERROR_TITLE: &str = "File Error";

/// One uploaded file: its client-side name and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a local file, keeping only its file name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// What a file name says about its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Pnl,
    TradeHistory,
    Spreadsheet,
    Unrecognized,
}

impl FileKind {
    pub fn classify(name: &str) -> Self {
        if name.contains("csv") {
            if name.contains("pnl") {
                Self::Pnl
            } else if name.contains("trade_history") {
                Self::TradeHistory
            } else {
                Self::Unrecognized
            }
        } else if name.contains("xls") {
            Self::Spreadsheet
        } else {
            Self::Unrecognized
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{name}: {source}")]
    PnlSchema {
        name: String,
        #[source]
        source: IngestError,
    },

    #[error("{name}: {source}")]
    TradeHistorySchema {
        name: String,
        #[source]
        source: IngestError,
    },

    #[error("{name}: spreadsheet uploads are not supported, export the sheet as CSV")]
    UnsupportedFormat { name: String },

    #[error("no PNL file in upload (expected a .csv file with `pnl` in its name)")]
    MissingPnlFile,

    #[error("{name}: {source}")]
    Processing {
        name: String,
        #[source]
        source: IngestError,
    },
}

/// The message a user sees when an upload fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    pub title: Option<String>,
    pub body: String,
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{title}: {}", self.body),
            None => f.write_str(&self.body),
        }
    }
}

impl UploadError {
    pub fn user_message(&self) -> UserMessage {
        let alert = |body: &str| UserMessage {
            title: Some(FILE_ERROR_TITLE.to_string()),
            body: body.to_string(),
        };
        match self {
            Self::PnlSchema { .. } | Self::MissingPnlFile => alert("There were no PNL file found"),
            Self::TradeHistorySchema { .. } => alert("There were no Trade History file found"),
            Self::UnsupportedFormat { .. } | Self::Processing { .. } => UserMessage {
                title: None,
                body: "There was an error processing this file.".to_string(),
            },
        }
    }

    fn from_ingest(name: &str, schema: FileSchema, source: IngestError) -> Self {
        let name = name.to_string();
        if !matches!(source, IngestError::Schema(_)) {
            return Self::Processing { name, source };
        }
        match schema {
            FileSchema::Pnl => Self::PnlSchema { name, source },
            FileSchema::TradeHistory => Self::TradeHistorySchema { name, source },
        }
    }
}

/// A successfully parsed upload batch.
#[derive(Debug, Clone)]
pub struct ParsedUpload {
    /// Name of the last file in the batch; used as the dashboard title.
    pub title: String,
    pub pnl_file: String,
    pub pnl: PnlSeries,
    pub trade_history_file: Option<String>,
    pub trade_history: Option<TradeHistory>,
    pub warnings: Vec<DataWarning>,
    /// BLAKE3 over every file name and content in upload order.
    pub fingerprint: String,
}

/// Parse a batch of uploaded files.
pub fn parse_uploads(files: &[UploadedFile]) -> Result<ParsedUpload, UploadError> {
    let mut pnl: Option<(String, PnlSeries, Vec<DataWarning>)> = None;
    let mut trades: Option<(String, TradeHistory, Vec<DataWarning>)> = None;

    for file in files {
        match FileKind::classify(&file.name) {
            FileKind::Pnl => {
                let ingested = read_pnl_csv(file.bytes.as_slice())
                    .map_err(|e| UploadError::from_ingest(&file.name, FileSchema::Pnl, e))?;
                if let Some((previous, ..)) = &pnl {
                    tracing::warn!(previous = %previous, replacement = %file.name, "second PNL file replaces the first");
                }
                tracing::info!(file = %file.name, rows = ingested.data.len(), "parsed PNL file");
                pnl = Some((file.name.clone(), ingested.data, ingested.warnings));
            }
            FileKind::TradeHistory => {
                let ingested = read_trade_history_csv(file.bytes.as_slice()).map_err(|e| {
                    UploadError::from_ingest(&file.name, FileSchema::TradeHistory, e)
                })?;
                if let Some((previous, ..)) = &trades {
                    tracing::warn!(previous = %previous, replacement = %file.name, "second trade history replaces the first");
                }
                tracing::info!(file = %file.name, trades = ingested.data.len(), "parsed trade history");
                trades = Some((file.name.clone(), ingested.data, ingested.warnings));
            }
            FileKind::Spreadsheet => {
                return Err(UploadError::UnsupportedFormat {
                    name: file.name.clone(),
                });
            }
            FileKind::Unrecognized => {
                tracing::warn!(file = %file.name, "ignoring upload with unrecognised name");
            }
        }
    }

    let (pnl_file, series, mut warnings) = pnl.ok_or(UploadError::MissingPnlFile)?;
    let (trade_history_file, trade_history) = match trades {
        Some((name, history, trade_warnings)) => {
            warnings.extend(trade_warnings);
            (Some(name), Some(history))
        }
        None => (None, None),
    };

    Ok(ParsedUpload {
        title: files.last().map(|f| f.name.clone()).unwrap_or_default(),
        pnl_file,
        pnl: series,
        trade_history_file,
        trade_history,
        warnings,
        fingerprint: fingerprint(files),
    })
}

/// Check one file's header against the schema its name implies, without
/// reading any data rows. Unrecognised names pass through unchecked.
pub fn check_header(file: &UploadedFile) -> Result<FileKind, UploadError> {
    let kind = FileKind::classify(&file.name);
    let schema = match kind {
        FileKind::Pnl => FileSchema::Pnl,
        FileKind::TradeHistory => FileSchema::TradeHistory,
        FileKind::Spreadsheet => {
            return Err(UploadError::UnsupportedFormat {
                name: file.name.clone(),
            })
        }
        FileKind::Unrecognized => return Ok(kind),
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file.bytes.as_slice());
    let checked = match rdr.headers() {
        Ok(header) => schema.validate(header.iter()).map_err(IngestError::from),
        Err(e) => Err(IngestError::from(e)),
    };
    checked.map_err(|e| UploadError::from_ingest(&file.name, schema, e))?;
    Ok(kind)
}

/// Deterministic BLAKE3 hash over the batch, in upload order.
pub fn fingerprint(files: &[UploadedFile]) -> String {
    let mut hasher = blake3::Hasher::new();
    for file in files {
        hasher.update(&(file.name.len() as u64).to_le_bytes());
        hasher.update(file.name.as_bytes());
        hasher.update(&(file.bytes.len() as u64).to_le_bytes());
        hasher.update(&file.bytes);
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnlboard_core::data::{PNL_HEADER, TRADE_HISTORY_HEADER};

    fn pnl_file(name: &str) -> UploadedFile {
        UploadedFile::new(
            name,
            format!("{PNL_HEADER}\n2024-01-02,0,1000000,1000000,0,0\n2024-01-03,0,1010000,1010000,10000,0.01\n"),
        )
    }

    fn trades_file(name: &str) -> UploadedFile {
        UploadedFile::new(
            name,
            format!("{TRADE_HISTORY_HEADER}\nAAPL,10,2023-01-03,100,2023-02-01,110,Closed,100\n"),
        )
    }

    #[test]
    fn classify_by_name() {
        assert_eq!(FileKind::classify("strategy_pnl.csv"), FileKind::Pnl);
        assert_eq!(FileKind::classify("trade_history.csv"), FileKind::TradeHistory);
        assert_eq!(FileKind::classify("book.xlsx"), FileKind::Spreadsheet);
        assert_eq!(FileKind::classify("notes.csv"), FileKind::Unrecognized);
        assert_eq!(FileKind::classify("pnl.txt"), FileKind::Unrecognized);
    }

    #[test]
    fn pnl_marker_wins_over_trade_history_marker() {
        assert_eq!(FileKind::classify("pnl_trade_history.csv"), FileKind::Pnl);
    }

    #[test]
    fn parses_pnl_and_trade_history() {
        let files = vec![pnl_file("a_pnl.csv"), trades_file("a_trade_history.csv")];
        let parsed = parse_uploads(&files).unwrap();
        assert_eq!(parsed.pnl.len(), 2);
        assert_eq!(parsed.title, "a_trade_history.csv");
        assert_eq!(parsed.pnl_file, "a_pnl.csv");
        assert_eq!(parsed.trade_history.unwrap().len(), 1);
        assert_eq!(parsed.fingerprint.len(), 64);
    }

    #[test]
    fn trade_history_is_optional() {
        let parsed = parse_uploads(&[pnl_file("x_pnl.csv")]).unwrap();
        assert!(parsed.trade_history.is_none());
        assert!(parsed.trade_history_file.is_none());
    }

    #[test]
    fn unrecognised_files_are_ignored() {
        let files = vec![UploadedFile::new("readme.csv", "hello"), pnl_file("x_pnl.csv")];
        assert!(parse_uploads(&files).is_ok());
    }

    #[test]
    fn missing_pnl_file_is_an_error() {
        let err = parse_uploads(&[trades_file("trade_history.csv")]).unwrap_err();
        assert!(matches!(err, UploadError::MissingPnlFile));
        assert_eq!(err.user_message().body, "There were no PNL file found");
    }

    #[test]
    fn pnl_header_mismatch_message() {
        let bad = UploadedFile::new("bad_pnl.csv", "Date,value\n2024-01-02,1\n");
        let err = parse_uploads(&[bad]).unwrap_err();
        assert!(matches!(err, UploadError::PnlSchema { .. }));
        let msg = err.user_message();
        assert_eq!(msg.title.as_deref(), Some("File Error"));
        assert_eq!(msg.body, "There were no PNL file found");
    }

    #[test]
    fn trade_history_header_mismatch_message() {
        let bad = UploadedFile::new("trade_history.csv", "Ticker,PnL\nAAPL,1\n");
        let err = parse_uploads(&[pnl_file("p_pnl.csv"), bad]).unwrap_err();
        assert!(matches!(err, UploadError::TradeHistorySchema { .. }));
        assert_eq!(err.user_message().body, "There were no Trade History file found");
    }

    #[test]
    fn malformed_data_is_a_processing_error() {
        let bad = UploadedFile::new("x_pnl.csv", format!("{PNL_HEADER}\nnot-a-date,1,1,1,1,1\n"));
        let err = parse_uploads(&[bad]).unwrap_err();
        assert!(matches!(err, UploadError::Processing { .. }));
        let msg = err.user_message();
        assert_eq!(msg.title, None);
        assert_eq!(msg.to_string(), "There was an error processing this file.");
    }

    #[test]
    fn spreadsheets_are_rejected() {
        let err = parse_uploads(&[UploadedFile::new("book.xls", vec![0u8, 1, 2])]).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedFormat { .. }));
    }

    #[test]
    fn last_pnl_file_wins() {
        let second = UploadedFile::new(
            "second_pnl.csv",
            format!("{PNL_HEADER}\n2024-02-01,0,1,1,0,0\n"),
        );
        let parsed = parse_uploads(&[pnl_file("first_pnl.csv"), second]).unwrap();
        assert_eq!(parsed.pnl_file, "second_pnl.csv");
        assert_eq!(parsed.pnl.len(), 1);
    }

    #[test]
    fn check_header_ignores_data_rows() {
        let file = UploadedFile::new("x_pnl.csv", format!("{PNL_HEADER}\nnot-a-date,,,,,\n"));
        assert_eq!(check_header(&file).unwrap(), FileKind::Pnl);
    }

    #[test]
    fn check_header_reports_schema_errors() {
        let bad = UploadedFile::new("x_trade_history.csv", "Ticker,Shares\n");
        let err = check_header(&bad).unwrap_err();
        assert!(matches!(err, UploadError::TradeHistorySchema { .. }));

        let empty = UploadedFile::new("x_pnl.csv", "");
        assert!(matches!(
            check_header(&empty).unwrap_err(),
            UploadError::PnlSchema { .. }
        ));
        assert_eq!(
            check_header(&UploadedFile::new("notes.txt", "")).unwrap(),
            FileKind::Unrecognized
        );
    }

    #[test]
    fn fingerprint_depends_on_content_and_order() {
        let a = pnl_file("a_pnl.csv");
        let b = trades_file("b_trade_history.csv");
        let ab = fingerprint(&[a.clone(), b.clone()]);
        assert_eq!(ab, fingerprint(&[a.clone(), b.clone()]));
        assert_ne!(ab, fingerprint(&[b, a]));
    }

    #[test]
    fn from_path_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_pnl.csv");
        std::fs::write(&path, PNL_HEADER).unwrap();
        let file = UploadedFile::from_path(&path).unwrap();
        assert_eq!(file.name, "run_pnl.csv");
        assert_eq!(file.bytes, PNL_HEADER.as_bytes());
    }
}
