//! Delimited-text (CSV) reader.
//!
//! Rows are read one at a time and normalised as they stream past. A
//! malformed row fails the whole read: rows decoded before the error are
//! discarded rather than returned as a partial result.

use std::io::Read;

use allot_core::record::Record;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{
  Result,
  normalize::{Row, normalize_row},
};

/// Iterate the rows of `reader`, keyed by the header line.
///
/// Ragged rows are accepted: missing trailing cells are simply absent from
/// the row, and cells beyond the header width are ignored.
pub fn read_rows<R: Read>(reader: R) -> Result<impl Iterator<Item = Result<Row>>> {
  let mut rdr = ReaderBuilder::new()
    .flexible(true)
    .trim(Trim::Headers)
    .from_reader(reader);

  let headers: Vec<String> = rdr
    .headers()?
    .iter()
    .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
    .collect();

  Ok(
    rdr
      .into_records()
      .map(move |record| -> Result<Row> { Ok(to_row(&headers, &record?)) }),
  )
}

fn to_row(headers: &[String], record: &StringRecord) -> Row {
  headers
    .iter()
    .zip(record.iter())
    .filter(|(h, v)| !h.is_empty() && !v.is_empty())
    .map(|(h, v)| (h.clone(), v.to_owned()))
    .collect()
}

/// Read and normalise every usable record from `reader`.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
  let mut records = Vec::new();
  for row in read_rows(reader)? {
    if let Some(record) = normalize_row(&row?) {
      records.push(record);
    }
  }
  Ok(records)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn reads_mixed_headers() {
    let input = "First Name,Phone,Notes\nAda,555-0100,vip\nGrace,,\n,555-0199,\n";
    let records = read_records(input.as_bytes()).unwrap();
    assert_eq!(
      records,
      [
        Record::new("Ada", "555-0100", "vip"),
        Record::new("Grace", "", ""),
        Record::new("", "555-0199", ""),
      ]
    );
  }

  #[test]
  fn drops_blank_and_notes_only_rows() {
    let input = "firstName,phone,notes\n,,\n  ,  ,just a note\nAlan,,\n";
    let records = read_records(input.as_bytes()).unwrap();
    assert_eq!(records, [Record::new("Alan", "", "")]);
  }

  #[test]
  fn quoted_fields_keep_commas_and_newlines() {
    let input = "FirstName,Phone,Notes\n\"Lovelace, Ada\",555,\"line one\nline two\"\n";
    let records = read_records(input.as_bytes()).unwrap();
    assert_eq!(records[0].first_name, "Lovelace, Ada");
    assert_eq!(records[0].notes, "line one\nline two");
  }

  #[test]
  fn header_spacing_and_bom_are_ignored() {
    let input = "\u{feff} First Name , Phone Number \nAda,555\n";
    let records = read_records(input.as_bytes()).unwrap();
    assert_eq!(records, [Record::new("Ada", "555", "")]);
  }

  #[test]
  fn ragged_rows_are_accepted() {
    let input = "FirstName,Phone,Notes\nAda\nGrace,555,vip,extra\n";
    let records = read_records(input.as_bytes()).unwrap();
    assert_eq!(
      records,
      [Record::new("Ada", "", ""), Record::new("Grace", "555", "vip")]
    );
  }

  #[test]
  fn empty_input_yields_no_records() {
    assert!(read_records(&b""[..]).unwrap().is_empty());
    assert!(read_records(&b"FirstName,Phone\n"[..]).unwrap().is_empty());
  }

  #[test]
  fn invalid_utf8_is_a_parse_error() {
    let input: &[u8] = b"FirstName,Phone\nAda,555\n\xff\xfe,123\n";
    let err = read_records(input);
    assert!(matches!(err, Err(Error::Delimited(_))));
  }
}
