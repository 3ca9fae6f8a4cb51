//! Distribution snapshots, the immutable result of one upload.
//!
//! A snapshot owns deep copies of everything it references: agent names are
//! frozen at upload time and records are detached from the source file, so a
//! stored snapshot stays a faithful audit record after the roster changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result, agent::RosterMember, partition::partition, record::Record,
};

// ─── Assignment ──────────────────────────────────────────────────────────────

/// The records handed to one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAssignment {
  pub agent_id:     Uuid,
  /// Copied from the roster at upload time; not updated on rename.
  pub agent_name:   String,
  /// A contiguous slice of the upload, in file order.
  pub records:      Vec<Record>,
  /// Always `records.len()`; stored for cheap summary display.
  pub record_count: usize,
}

impl AgentAssignment {
  pub fn new(member: &RosterMember, records: Vec<Record>) -> Self {
    Self {
      agent_id: member.agent_id,
      agent_name: member.name.clone(),
      record_count: records.len(),
      records,
    }
  }

  pub fn summary(&self) -> AssignmentSummary {
    AssignmentSummary {
      agent_name:   self.agent_name.clone(),
      record_count: self.record_count,
    }
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The persisted unit: one upload, partitioned across the active roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSnapshot {
  pub distribution_id: Uuid,
  /// Original upload name; metadata only.
  pub file_name:       String,
  pub uploaded_at:     DateTime<Utc>,
  pub total_records:   usize,
  /// One entry per roster member, in roster order.
  pub assignments:     Vec<AgentAssignment>,
}

impl DistributionSnapshot {
  /// Partition `records` across `roster` and wrap the result in a new
  /// snapshot with a fresh identifier and the current time.
  pub fn build(
    file_name: impl Into<String>,
    records: Vec<Record>,
    roster: &[RosterMember],
  ) -> Result<Self> {
    Self::build_at(Uuid::new_v4(), Utc::now(), file_name, records, roster)
  }

  /// As [`DistributionSnapshot::build`], with caller-supplied identity and
  /// timestamp.
  ///
  /// Rejects an empty roster before attempting a partition, and an empty
  /// record list before building anything.
  pub fn build_at(
    distribution_id: Uuid,
    uploaded_at: DateTime<Utc>,
    file_name: impl Into<String>,
    records: Vec<Record>,
    roster: &[RosterMember],
  ) -> Result<Self> {
    if roster.is_empty() {
      return Err(Error::EmptyRoster);
    }
    if records.is_empty() {
      return Err(Error::EmptyInput);
    }

    let total_records = records.len();
    let snapshot = Self {
      distribution_id,
      file_name: file_name.into(),
      uploaded_at,
      total_records,
      assignments: partition(records, roster)?,
    };
    snapshot.check_invariants(roster.len())?;
    Ok(snapshot)
  }

  /// Verify that every record and every roster member is accounted for.
  pub fn check_invariants(&self, roster_len: usize) -> Result<()> {
    if self.assignments.len() != roster_len {
      return Err(Error::InvariantViolation(format!(
        "{} assignments for {roster_len} agents",
        self.assignments.len()
      )));
    }
    if let Some(a) = self
      .assignments
      .iter()
      .find(|a| a.record_count != a.records.len())
    {
      return Err(Error::InvariantViolation(format!(
        "assignment for {} reports {} records but holds {}",
        a.agent_id,
        a.record_count,
        a.records.len()
      )));
    }
    let assigned: usize = self.assignments.iter().map(|a| a.record_count).sum();
    if assigned != self.total_records {
      return Err(Error::InvariantViolation(format!(
        "{assigned} records assigned out of {}",
        self.total_records
      )));
    }
    Ok(())
  }

  pub fn agent_count(&self) -> usize { self.assignments.len() }

  /// The lightweight listing view.
  pub fn summary(&self) -> DistributionSummary {
    DistributionSummary {
      distribution_id: self.distribution_id,
      file_name:       self.file_name.clone(),
      uploaded_at:     self.uploaded_at,
      total_records:   self.total_records,
      agent_count:     self.agent_count(),
    }
  }

  /// The immediate response to an upload; omits record bodies.
  pub fn receipt(&self) -> UploadReceipt {
    UploadReceipt {
      distribution_id: self.distribution_id,
      file_name:       self.file_name.clone(),
      total_records:   self.total_records,
      agent_count:     self.agent_count(),
      assignments:     self
        .assignments
        .iter()
        .map(AgentAssignment::summary)
        .collect(),
    }
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// One row of the time-ordered distribution listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
  pub distribution_id: Uuid,
  pub file_name:       String,
  pub uploaded_at:     DateTime<Utc>,
  pub total_records:   usize,
  pub agent_count:     usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
  pub agent_name:   String,
  pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
  pub distribution_id: Uuid,
  pub file_name:       String,
  pub total_records:   usize,
  pub agent_count:     usize,
  pub assignments:     Vec<AssignmentSummary>,
}
