//! The distribution partitioner.
//!
//! `n` records over `k` agents: every agent gets `n / k` records and the
//! first `n % k` agents in roster order get one extra. Each agent receives a
//! contiguous slice of the input, so agent 1 holds `[0, s1)`, agent 2 holds
//! `[s1, s1 + s2)`, and so on. Records are never interleaved or reordered.

use crate::{Error, Result, agent::RosterMember, distribution::AgentAssignment, record::Record};

/// Per-agent record counts for `n` records over `k` agents, in roster order.
///
/// Returns an empty vector when `k == 0`.
pub fn shares(n: usize, k: usize) -> Vec<usize> {
  if k == 0 {
    return Vec::new();
  }
  let base = n / k;
  let remainder = n % k;
  (0..k).map(|i| base + usize::from(i < remainder)).collect()
}

/// Split `records` across `roster`, one assignment per roster member.
///
/// Members that receive no records (when there are fewer records than
/// agents) still appear with an empty assignment. An empty roster is
/// rejected with [`Error::EmptyRoster`].
pub fn partition(
  records: Vec<Record>,
  roster: &[RosterMember],
) -> Result<Vec<AgentAssignment>> {
  if roster.is_empty() {
    return Err(Error::EmptyRoster);
  }

  let counts = shares(records.len(), roster.len());
  let mut remaining = records.into_iter();

  Ok(
    roster
      .iter()
      .zip(counts)
      .map(|(member, count)| {
        AgentAssignment::new(member, remaining.by_ref().take(count).collect())
      })
      .collect(),
  )
}
