//! Record-source readers for allot.
//!
//! Converts uploaded delimited-text and spreadsheet files into normalised
//! [`Record`]s. Format parsing and normalisation are decoupled: each reader
//! produces header-keyed [`Row`]s and both feed the same
//! [`normalize::normalize_row`]. Pure synchronous; no HTTP or database
//! dependencies, and no logging.
//!
//! # Quick start
//!
//! ```no_run
//! let csv = b"First Name,Phone\nAda,555-0100\n";
//! let records = allot_ingest::parse_upload("leads.csv", csv).unwrap();
//! assert_eq!(records[0].first_name, "Ada");
//! ```

pub mod delimited;
pub mod error;
pub mod normalize;
pub mod workbook;

use std::path::Path;

use allot_core::record::Record;

pub use error::{Error, Result};
pub use normalize::Row;

/// The two tabular encodings accepted for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
  /// Comma-separated text with a header line.
  Delimited,
  /// A spreadsheet workbook; only the first sheet is read.
  Workbook,
}

impl SourceFormat {
  /// Pick a format from the upload's file extension (case-insensitive).
  pub fn from_file_name(file_name: &str) -> Result<Self> {
    let ext = Path::new(file_name)
      .extension()
      .and_then(|e| e.to_str())
      .map(str::to_ascii_lowercase)
      .unwrap_or_default();

    match ext.as_str() {
      "csv" => Ok(Self::Delimited),
      "xlsx" | "xls" => Ok(Self::Workbook),
      _ => Err(Error::UnsupportedFormat(file_name.to_owned())),
    }
  }
}

/// Parse `bytes` as `format` and normalise the result.
pub fn parse(bytes: &[u8], format: SourceFormat) -> Result<Vec<Record>> {
  match format {
    SourceFormat::Delimited => delimited::read_records(bytes),
    SourceFormat::Workbook => workbook::read_records(bytes),
  }
}

/// Detect the format from `file_name`, then [`parse`] `bytes`.
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<Vec<Record>> {
  parse(bytes, SourceFormat::from_file_name(file_name)?)
}
