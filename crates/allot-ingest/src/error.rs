//! Error types for the allot-ingest readers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid file type {0:?}; only CSV, XLSX, and XLS files are allowed")]
  UnsupportedFormat(String),

  #[error("malformed delimited text: {0}")]
  Delimited(#[from] csv::Error),

  #[error("unreadable workbook: {0}")]
  Workbook(#[from] calamine::Error),

  #[error("workbook contains no worksheets")]
  NoWorksheet,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
