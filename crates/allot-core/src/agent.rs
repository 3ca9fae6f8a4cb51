//! Agents: the identities eligible to receive assignments.
//!
//! Agents are managed outside the distribution engine. The engine only ever
//! sees a [`RosterMember`] projection of the agents that were active when an
//! upload was processed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Agent ───────────────────────────────────────────────────────────────────

/// A stored agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
  pub agent_id:   Uuid,
  pub name:       String,
  pub email:      String,
  pub mobile:     String,
  /// Only active agents take part in distribution.
  pub is_active:  bool,
  /// Server-assigned; also defines roster order.
  pub created_at: DateTime<Utc>,
}

impl Agent {
  /// Project this agent to the value copied into assignments.
  pub fn roster_member(&self) -> RosterMember {
    RosterMember {
      agent_id: self.agent_id,
      name:     self.name.clone(),
    }
  }
}

/// The `{id, name}` pair the partitioner works with.
///
/// This is a value copy taken at upload time, never a live reference to the
/// stored agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
  pub agent_id: Uuid,
  pub name:     String,
}

impl RosterMember {
  pub fn new(agent_id: Uuid, name: impl Into<String>) -> Self {
    Self { agent_id, name: name.into() }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::AllotStore::add_agent`].
/// `agent_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgent {
  pub name:   String,
  pub email:  String,
  pub mobile: String,
}

impl NewAgent {
  /// Check and normalise the input: the name is trimmed and the email
  /// lower-cased.
  pub fn validate(self) -> Result<Self> {
    Ok(Self {
      name:   validate_name(&self.name)?,
      email:  validate_email(&self.email)?,
      mobile: validate_mobile(&self.mobile)?,
    })
  }
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mobile:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_active: Option<bool>,
}

impl AgentPatch {
  /// Validate and normalise only the fields that are present.
  pub fn validate(self) -> Result<Self> {
    Ok(Self {
      name:      self.name.as_deref().map(validate_name).transpose()?,
      email:     self.email.as_deref().map(validate_email).transpose()?,
      mobile:    self.mobile.as_deref().map(validate_mobile).transpose()?,
      is_active: self.is_active,
    })
  }

  pub fn apply(self, agent: &mut Agent) {
    if let Some(name) = self.name {
      agent.name = name;
    }
    if let Some(email) = self.email {
      agent.email = email;
    }
    if let Some(mobile) = self.mobile {
      agent.mobile = mobile;
    }
    if let Some(is_active) = self.is_active {
      agent.is_active = is_active;
    }
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn validate_name(name: &str) -> Result<String> {
  let name = name.trim();
  if name.chars().count() < 2 {
    return Err(Error::Validation(
      "name must be at least 2 characters long".into(),
    ));
  }
  Ok(name.to_owned())
}

fn validate_email(email: &str) -> Result<String> {
  let email = email.trim().to_lowercase();
  let valid = match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
    }
    None => false,
  };
  if !valid {
    return Err(Error::Validation(format!("invalid email address: {email:?}")));
  }
  Ok(email)
}

fn validate_mobile(mobile: &str) -> Result<String> {
  let mobile = mobile.trim();
  let allowed = mobile
    .chars()
    .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
  let digits = mobile.chars().filter(char::is_ascii_digit).count();
  if !allowed || digits < 7 {
    return Err(Error::Validation(format!(
      "invalid mobile number: {mobile:?}"
    )));
  }
  Ok(mobile.to_owned())
}
