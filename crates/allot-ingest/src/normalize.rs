//! Record normalisation.
//!
//! Both readers produce [`Row`]s keyed by header text; this module maps them
//! onto the canonical [`Record`] shape and drops rows with neither a name nor
//! a phone number.

use std::collections::HashMap;

use allot_core::record::Record;

/// One source row: header name to cell text. Empty cells may be absent.
pub type Row = HashMap<String, String>;

/// Accepted headers per field, in lookup order: canonical lower-camel key,
/// exact-cased header, then the spelled-out alias.
pub const FIRST_NAME_HEADERS: [&str; 3] = ["firstName", "FirstName", "First Name"];
pub const PHONE_HEADERS: [&str; 3] = ["phone", "Phone", "Phone Number"];
pub const NOTES_HEADERS: [&str; 3] = ["notes", "Notes", "Note"];

/// The first non-empty value among `headers`, or `""`.
fn resolve<'a>(row: &'a Row, headers: &[&str]) -> &'a str {
  headers
    .iter()
    .filter_map(|h| row.get(*h))
    .map(String::as_str)
    .find(|v| !v.is_empty())
    .unwrap_or("")
}

/// Map a single row, returning `None` when it carries neither a name nor a
/// phone number.
pub fn normalize_row(row: &Row) -> Option<Record> {
  let record = Record::new(
    resolve(row, &FIRST_NAME_HEADERS),
    resolve(row, &PHONE_HEADERS),
    resolve(row, &NOTES_HEADERS),
  );
  record.is_usable().then_some(record)
}

/// Normalise `rows`, preserving the order of the rows that survive.
pub fn normalize<I>(rows: I) -> Vec<Record>
where
  I: IntoIterator<Item = Row>,
{
  rows.into_iter().filter_map(|r| normalize_row(&r)).collect()
}
