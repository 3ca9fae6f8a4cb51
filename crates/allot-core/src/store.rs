//! The `AllotStore` trait: agent roster provider plus distribution store.
//!
//! Implemented by storage backends (e.g. `allot-store-sqlite`). Higher layers
//! (`allot-api`) depend on this abstraction, not on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  agent::{Agent, AgentPatch, NewAgent, RosterMember},
  distribution::{DistributionSnapshot, DistributionSummary},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an allot storage backend.
///
/// Agents are ordinary mutable rows. Distribution snapshots are written once
/// and never updated; the only mutation is whole-snapshot deletion.
pub trait AllotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Agents ────────────────────────────────────────────────────────────

  /// Persist a new, active agent. The store assigns the id and timestamp.
  /// Input is expected to have passed [`NewAgent::validate`].
  fn add_agent(
    &self,
    input: NewAgent,
  ) -> impl Future<Output = Result<Agent, Self::Error>> + Send + '_;

  /// Retrieve an agent by UUID. Returns `None` if not found.
  fn get_agent(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Agent>, Self::Error>> + Send + '_;

  /// Look up an agent by email, case-insensitively.
  fn find_agent_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Agent>, Self::Error>> + Send + 'a;

  /// All agents, active or not, in creation order.
  fn list_agents(
    &self,
  ) -> impl Future<Output = Result<Vec<Agent>, Self::Error>> + Send + '_;

  /// Apply `patch` and return the updated agent, or `None` if not found.
  fn update_agent(
    &self,
    id: Uuid,
    patch: AgentPatch,
  ) -> impl Future<Output = Result<Option<Agent>, Self::Error>> + Send + '_;

  /// Delete an agent. Returns `false` if it did not exist. Snapshots that
  /// mention the agent are unaffected.
  fn delete_agent(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The active agents in creation order, read once for a single upload.
  fn active_roster(
    &self,
  ) -> impl Future<Output = Result<Vec<RosterMember>, Self::Error>> + Send + '_;

  // ── Distributions ─────────────────────────────────────────────────────

  /// Persist a complete snapshot atomically.
  fn save_distribution<'a>(
    &'a self,
    snapshot: &'a DistributionSnapshot,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Retrieve a full snapshot, including every record.
  fn get_distribution(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<DistributionSnapshot>, Self::Error>>
  + Send
  + '_;

  /// Summaries of all snapshots, newest first.
  fn list_distributions(
    &self,
  ) -> impl Future<Output = Result<Vec<DistributionSummary>, Self::Error>> + Send + '_;

  /// Delete a snapshot and everything it owns. Returns `false` if it did not
  /// exist.
  fn delete_distribution(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
