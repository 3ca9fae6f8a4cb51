//! A single contact entry taken from an uploaded list.

use serde::{Deserialize, Serialize};

/// A normalised contact row.
///
/// Records are plain values. Once inside a snapshot they are owned by their
/// assignment and never shared with the source file or other snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  pub first_name: String,
  /// Free-form; no phone-format validation happens at this layer.
  pub phone:      String,
  #[serde(default)]
  pub notes:      String,
}

impl Record {
  pub fn new(
    first_name: impl Into<String>,
    phone: impl Into<String>,
    notes: impl Into<String>,
  ) -> Self {
    Self {
      first_name: first_name.into(),
      phone:      phone.into(),
      notes:      notes.into(),
    }
  }

  /// A record is usable when it carries a name or a phone number once
  /// surrounding whitespace is ignored.
  pub fn is_usable(&self) -> bool {
    !self.first_name.trim().is_empty() || !self.phone.trim().is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn phone_only_is_usable() {
    assert!(Record::new("", "555-0100", "").is_usable());
  }

  #[test]
  fn name_only_is_usable() {
    assert!(Record::new("Ada", "", "").is_usable());
  }

  #[test]
  fn whitespace_and_notes_only_is_not_usable() {
    assert!(!Record::new("  ", "\t", "call back later").is_usable());
  }
}
