//! Spreadsheet workbook reader (`.xlsx`, `.xls`, `.xlsm`, `.ods`).
//!
//! Only the first worksheet is read. Its first non-empty row is the header
//! row; every following row becomes a [`Row`] keyed by those headers.

use std::io::Cursor;

use allot_core::record::Record;
use calamine::{Data, Reader, open_workbook_auto_from_rs};

use crate::{
  Error, Result,
  normalize::{Row, normalize},
};

/// Read the rows of the first worksheet in `bytes`.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<Row>> {
  let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
  let range = workbook.worksheet_range_at(0).ok_or(Error::NoWorksheet)??;

  let mut rows = range.rows();
  let Some(header_cells) = rows.next() else {
    return Ok(Vec::new());
  };
  let headers: Vec<String> =
    header_cells.iter().map(|c| cell_text(c).trim().to_owned()).collect();

  Ok(
    rows
      .map(|cells| {
        headers
          .iter()
          .zip(cells)
          .map(|(h, c)| (h, cell_text(c)))
          .filter(|(h, v)| !h.is_empty() && !v.is_empty())
          .map(|(h, v)| (h.clone(), v))
          .collect()
      })
      .collect(),
  )
}

/// Display text of a cell. Whole numbers render without a trailing `.0`, so a
/// phone number typed as a number reads back as its digits.
fn cell_text(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// Read and normalise every usable record from the first worksheet.
pub fn read_records(bytes: &[u8]) -> Result<Vec<Record>> {
  Ok(normalize(read_rows(bytes)?))
}
