//! Plain-text rendering of API responses for the terminal.

use std::fmt::Write as _;

use allot_core::{
  agent::Agent,
  distribution::{DistributionSnapshot, DistributionSummary, UploadReceipt},
  record::Record,
};

/// Records shown per assignment by `allot show` unless overridden.
pub const DEFAULT_PREVIEW: usize = 5;

const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S UTC";

fn or_na(value: &str) -> &str {
  if value.trim().is_empty() { "N/A" } else { value }
}

pub fn agents(agents: &[Agent]) -> String {
  if agents.is_empty() {
    return "No agents.\n".to_string();
  }
  let mut out = String::new();
  for a in agents {
    let status = if a.is_active { "active" } else { "inactive" };
    let _ = writeln!(
      out,
      "{}  {:<24} {:<32} {:<16} {status}",
      a.agent_id, a.name, a.email, a.mobile
    );
  }
  out
}

pub fn receipt(receipt: &UploadReceipt) -> String {
  let mut out = String::new();
  let _ = writeln!(
    out,
    "Distributed {} records from {} across {} agents.",
    receipt.total_records, receipt.file_name, receipt.agent_count
  );
  let _ = writeln!(out, "Distribution: {}", receipt.distribution_id);
  for a in &receipt.assignments {
    let _ = writeln!(out, "  {:<24} {:>6} records", a.agent_name, a.record_count);
  }
  out
}

pub fn summaries(lists: &[DistributionSummary]) -> String {
  if lists.is_empty() {
    return "No distributions.\n".to_string();
  }
  let mut out = String::new();
  for s in lists {
    let _ = writeln!(
      out,
      "{}  {}  {:<32} {:>6} records / {} agents",
      s.distribution_id,
      s.uploaded_at.format(TIMESTAMP),
      s.file_name,
      s.total_records,
      s.agent_count
    );
  }
  out
}

fn record_line(out: &mut String, r: &Record) {
  let _ = writeln!(
    out,
    "    Name: {}  Phone: {}  Notes: {}",
    or_na(&r.first_name),
    or_na(&r.phone),
    or_na(&r.notes)
  );
}

/// Full view of one snapshot, showing at most `preview` records per agent.
pub fn snapshot(snapshot: &DistributionSnapshot, preview: usize) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", snapshot.file_name);
  let _ = writeln!(out, "  id:       {}", snapshot.distribution_id);
  let _ = writeln!(out, "  uploaded: {}", snapshot.uploaded_at.format(TIMESTAMP));
  let _ = writeln!(
    out,
    "  {} records across {} agents",
    snapshot.total_records,
    snapshot.agent_count()
  );

  for a in &snapshot.assignments {
    let _ = writeln!(out);
    let _ = writeln!(out, "  {} ({} records)", a.agent_name, a.record_count);
    for r in a.records.iter().take(preview) {
      record_line(&mut out, r);
    }
    let hidden = a.records.len().saturating_sub(preview);
    if hidden > 0 {
      let _ = writeln!(out, "    ... and {hidden} more records");
    }
  }
  out
}
