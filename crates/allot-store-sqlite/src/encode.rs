//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order is chronological. UUIDs are stored as
//! hyphenated lowercase strings; counts and positions as integers.

use allot_core::{
  agent::{Agent, RosterMember},
  distribution::{AgentAssignment, DistributionSnapshot, DistributionSummary},
  record::Record,
};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_count(n: usize) -> i64 { n as i64 }

pub fn decode_count(n: i64) -> Result<usize> {
  usize::try_from(n).map_err(|_| Error::Corrupt(format!("negative count {n}")))
}

// ─── Agents ──────────────────────────────────────────────────────────────────

/// Raw values read directly from an `agents` row.
pub struct RawAgent {
  pub agent_id:   String,
  pub name:       String,
  pub email:      String,
  pub mobile:     String,
  pub is_active:  bool,
  pub created_at: String,
}

impl RawAgent {
  pub fn into_agent(self) -> Result<Agent> {
    Ok(Agent {
      agent_id:   decode_uuid(&self.agent_id)?,
      name:       self.name,
      email:      self.email,
      mobile:     self.mobile,
      is_active:  self.is_active,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawRosterMember {
  pub agent_id: String,
  pub name:     String,
}

impl RawRosterMember {
  pub fn into_member(self) -> Result<RosterMember> {
    Ok(RosterMember {
      agent_id: decode_uuid(&self.agent_id)?,
      name:     self.name,
    })
  }
}

// ─── Distributions ───────────────────────────────────────────────────────────

/// Raw values for a `distributions` row.
pub struct RawDistribution {
  pub distribution_id: String,
  pub file_name:       String,
  pub uploaded_at:     String,
  pub total_records:   i64,
}

/// Raw values for an `assignments` row.
pub struct RawAssignment {
  pub position:     i64,
  pub agent_id:     String,
  pub agent_name:   String,
  pub record_count: i64,
}

/// Raw values for an `assignment_records` row.
pub struct RawRecord {
  pub assignment_position: i64,
  pub position:            i64,
  pub first_name:          String,
  pub phone:               String,
  pub notes:               String,
}

/// A whole snapshot flattened into table rows.
pub struct RawSnapshot {
  pub distribution: RawDistribution,
  pub assignments:  Vec<RawAssignment>,
  pub records:      Vec<RawRecord>,
}

impl RawSnapshot {
  pub fn encode(snapshot: &DistributionSnapshot) -> Self {
    let distribution = RawDistribution {
      distribution_id: encode_uuid(snapshot.distribution_id),
      file_name:       snapshot.file_name.clone(),
      uploaded_at:     encode_dt(snapshot.uploaded_at),
      total_records:   encode_count(snapshot.total_records),
    };

    let mut assignments = Vec::with_capacity(snapshot.assignments.len());
    let mut records = Vec::with_capacity(snapshot.total_records);
    for (i, a) in snapshot.assignments.iter().enumerate() {
      let assignment_position = encode_count(i);
      assignments.push(RawAssignment {
        position:     assignment_position,
        agent_id:     encode_uuid(a.agent_id),
        agent_name:   a.agent_name.clone(),
        record_count: encode_count(a.record_count),
      });
      records.extend(a.records.iter().enumerate().map(|(j, r)| RawRecord {
        assignment_position,
        position: encode_count(j),
        first_name: r.first_name.clone(),
        phone: r.phone.clone(),
        notes: r.notes.clone(),
      }));
    }

    Self { distribution, assignments, records }
  }

  /// Rebuild the snapshot. Assignments and records must be sorted by
  /// position; the result is checked against the snapshot invariants.
  pub fn into_snapshot(self) -> Result<DistributionSnapshot> {
    let mut records = self.records.into_iter().peekable();
    let mut assignments = Vec::with_capacity(self.assignments.len());

    for raw in self.assignments {
      let mut owned = Vec::new();
      while let Some(r) =
        records.next_if(|r| r.assignment_position == raw.position)
      {
        owned.push(Record::new(r.first_name, r.phone, r.notes));
      }
      assignments.push(AgentAssignment {
        agent_id:     decode_uuid(&raw.agent_id)?,
        agent_name:   raw.agent_name,
        records:      owned,
        record_count: decode_count(raw.record_count)?,
      });
    }

    if let Some(orphan) = records.next() {
      return Err(Error::Corrupt(format!(
        "record at assignment position {} has no assignment",
        orphan.assignment_position
      )));
    }

    let d = self.distribution;
    let snapshot = DistributionSnapshot {
      distribution_id: decode_uuid(&d.distribution_id)?,
      file_name: d.file_name,
      uploaded_at: decode_dt(&d.uploaded_at)?,
      total_records: decode_count(d.total_records)?,
      assignments,
    };
    snapshot.check_invariants(snapshot.assignments.len())?;
    Ok(snapshot)
  }
}

/// Raw values for one row of the distribution listing.
pub struct RawSummary {
  pub distribution: RawDistribution,
  pub agent_count:  i64,
}

impl RawSummary {
  pub fn into_summary(self) -> Result<DistributionSummary> {
    let d = self.distribution;
    Ok(DistributionSummary {
      distribution_id: decode_uuid(&d.distribution_id)?,
      file_name:       d.file_name,
      uploaded_at:     decode_dt(&d.uploaded_at)?,
      total_records:   decode_count(d.total_records)?,
      agent_count:     decode_count(self.agent_count)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let whole = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let frac = whole + chrono::Duration::microseconds(500_000);
    assert_eq!(encode_dt(whole), "2024-01-02T03:04:05.000000Z");
    assert_eq!(encode_dt(frac), "2024-01-02T03:04:05.500000Z");
    assert!(encode_dt(whole) < encode_dt(frac));
    assert_eq!(decode_dt(&encode_dt(frac)).unwrap(), frac);
  }

  #[test]
  fn negative_counts_are_corrupt() {
    assert!(matches!(decode_count(-1), Err(Error::Corrupt(_))));
  }

  #[test]
  fn orphan_records_are_corrupt() {
    let raw = RawSnapshot {
      distribution: RawDistribution {
        distribution_id: encode_uuid(Uuid::new_v4()),
        file_name:       "x.csv".into(),
        uploaded_at:     encode_dt(Utc::now()),
        total_records:   1,
      },
      assignments:  vec![RawAssignment {
        position:     0,
        agent_id:     encode_uuid(Uuid::new_v4()),
        agent_name:   "Ada".into(),
        record_count: 0,
      }],
      records:      vec![RawRecord {
        assignment_position: 3,
        position:            0,
        first_name:          "stray".into(),
        phone:               String::new(),
        notes:               String::new(),
      }],
    };
    assert!(matches!(raw.into_snapshot(), Err(Error::Corrupt(_))));
  }
}
