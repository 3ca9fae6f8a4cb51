//! [`SqliteStore`], the SQLite implementation of [`AllotStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use allot_core::{
  agent::{Agent, AgentPatch, NewAgent, RosterMember},
  distribution::{DistributionSnapshot, DistributionSummary},
  store::AllotStore,
};

use crate::{
  Error, Result,
  encode::{
    RawAgent, RawAssignment, RawDistribution, RawRecord, RawRosterMember,
    RawSnapshot, RawSummary, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

const AGENT_COLUMNS: &str = "agent_id, name, email, mobile, is_active, created_at";

fn raw_agent(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAgent> {
  Ok(RawAgent {
    agent_id:   row.get(0)?,
    name:       row.get(1)?,
    email:      row.get(2)?,
    mobile:     row.get(3)?,
    is_active:  row.get(4)?,
    created_at: row.get(5)?,
  })
}

fn duplicate_email(email: &str) -> Error {
  Error::Core(allot_core::Error::DuplicateEmail(email.to_owned()))
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An allot store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write every column of `agent` over the existing row. Returns `false`
  /// when no row has that id.
  pub(crate) async fn write_agent(&self, agent: &Agent) -> Result<bool> {
    let id_str = encode_uuid(agent.agent_id);
    let name   = agent.name.clone();
    let email  = agent.email.clone();
    let mobile = agent.mobile.clone();
    let active = agent.is_active;

    let changed: Option<usize> = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "UPDATE agents SET name = ?2, email = ?3, mobile = ?4, is_active = ?5
           WHERE agent_id = ?1",
          rusqlite::params![id_str, name, email, mobile, active],
        ) {
          Ok(n) => Ok(Some(n)),
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    match changed {
      Some(n) => Ok(n > 0),
      None => Err(duplicate_email(&agent.email)),
    }
  }

  /// Run a statement directly against the connection.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<usize> {
    Ok(self.conn.call(move |conn| Ok(conn.execute(sql, [])?)).await?)
  }
}

// ─── AllotStore impl ─────────────────────────────────────────────────────────

impl AllotStore for SqliteStore {
  type Error = Error;

  // ── Agents ────────────────────────────────────────────────────────────────

  async fn add_agent(&self, input: NewAgent) -> Result<Agent> {
    let agent = Agent {
      agent_id:   Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      mobile:     input.mobile,
      is_active:  true,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(agent.agent_id);
    let at_str = encode_dt(agent.created_at);
    let name   = agent.name.clone();
    let email  = agent.email.clone();
    let mobile = agent.mobile.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO agents (agent_id, name, email, mobile, is_active, created_at)
           VALUES (?1, ?2, ?3, ?4, 1, ?5)",
          rusqlite::params![id_str, name, email, mobile, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(duplicate_email(&agent.email));
    }
    Ok(agent)
  }

  async fn get_agent(&self, id: Uuid) -> Result<Option<Agent>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAgent> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {AGENT_COLUMNS} FROM agents WHERE agent_id = ?1"),
            rusqlite::params![id_str],
            raw_agent,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAgent::into_agent).transpose()
  }

  async fn find_agent_by_email(&self, email: &str) -> Result<Option<Agent>> {
    let email = email.trim().to_owned();

    let raw: Option<RawAgent> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {AGENT_COLUMNS} FROM agents WHERE email = ?1"),
            rusqlite::params![email],
            raw_agent,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAgent::into_agent).transpose()
  }

  async fn list_agents(&self) -> Result<Vec<Agent>> {
    let raws: Vec<RawAgent> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!(
          "SELECT {AGENT_COLUMNS} FROM agents ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map([], raw_agent)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAgent::into_agent).collect()
  }

  async fn update_agent(&self, id: Uuid, patch: AgentPatch) -> Result<Option<Agent>> {
    let Some(mut agent) = self.get_agent(id).await? else {
      return Ok(None);
    };
    patch.apply(&mut agent);

    if !self.write_agent(&agent).await? {
      return Ok(None);
    }
    Ok(Some(agent))
  }

  async fn delete_agent(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM agents WHERE agent_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn active_roster(&self) -> Result<Vec<RosterMember>> {
    let raws: Vec<RawRosterMember> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT agent_id, name FROM agents WHERE is_active = 1
           ORDER BY created_at, rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRosterMember {
              agent_id: row.get(0)?,
              name:     row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRosterMember::into_member).collect()
  }

  // ── Distributions ─────────────────────────────────────────────────────────

  async fn save_distribution(&self, snapshot: &DistributionSnapshot) -> Result<()> {
    snapshot.check_invariants(snapshot.assignments.len())?;
    let raw = RawSnapshot::encode(snapshot);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let d = &raw.distribution;
        tx.execute(
          "INSERT INTO distributions (distribution_id, file_name, uploaded_at, total_records)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![d.distribution_id, d.file_name, d.uploaded_at, d.total_records],
        )?;
        {
          let mut insert_assignment = tx.prepare(
            "INSERT INTO assignments
               (distribution_id, position, agent_id, agent_name, record_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for a in &raw.assignments {
            insert_assignment.execute(rusqlite::params![
              d.distribution_id,
              a.position,
              a.agent_id,
              a.agent_name,
              a.record_count,
            ])?;
          }

          let mut insert_record = tx.prepare(
            "INSERT INTO assignment_records
               (distribution_id, assignment_position, position, first_name, phone, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for r in &raw.records {
            insert_record.execute(rusqlite::params![
              d.distribution_id,
              r.assignment_position,
              r.position,
              r.first_name,
              r.phone,
              r.notes,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_distribution(&self, id: Uuid) -> Result<Option<DistributionSnapshot>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSnapshot> = self
      .conn
      .call(move |conn| {
        let distribution = conn
          .query_row(
            "SELECT distribution_id, file_name, uploaded_at, total_records
             FROM distributions WHERE distribution_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawDistribution {
                distribution_id: row.get(0)?,
                file_name:       row.get(1)?,
                uploaded_at:     row.get(2)?,
                total_records:   row.get(3)?,
              })
            },
          )
          .optional()?;

        let Some(distribution) = distribution else {
          return Ok(None);
        };

        let assignments = conn
          .prepare(
            "SELECT position, agent_id, agent_name, record_count
             FROM assignments WHERE distribution_id = ?1
             ORDER BY position",
          )?
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAssignment {
              position:     row.get(0)?,
              agent_id:     row.get(1)?,
              agent_name:   row.get(2)?,
              record_count: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let records = conn
          .prepare(
            "SELECT assignment_position, position, first_name, phone, notes
             FROM assignment_records WHERE distribution_id = ?1
             ORDER BY assignment_position, position",
          )?
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawRecord {
              assignment_position: row.get(0)?,
              position:            row.get(1)?,
              first_name:          row.get(2)?,
              phone:               row.get(3)?,
              notes:               row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(RawSnapshot { distribution, assignments, records }))
      })
      .await?;

    raw.map(RawSnapshot::into_snapshot).transpose()
  }

  async fn list_distributions(&self) -> Result<Vec<DistributionSummary>> {
    let raws: Vec<RawSummary> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT d.distribution_id, d.file_name, d.uploaded_at, d.total_records,
                  (SELECT COUNT(*) FROM assignments a
                    WHERE a.distribution_id = d.distribution_id)
           FROM distributions d
           ORDER BY d.uploaded_at DESC, d.rowid DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSummary {
              distribution: RawDistribution {
                distribution_id: row.get(0)?,
                file_name:       row.get(1)?,
                uploaded_at:     row.get(2)?,
                total_records:   row.get(3)?,
              },
              agent_count:  row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  async fn delete_distribution(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM distributions WHERE distribution_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }
}
