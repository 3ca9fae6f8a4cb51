//! Error types for `allot-core`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("no active agents found; add or activate agents first")]
  EmptyRoster,

  #[error("no valid records found in the uploaded file")]
  EmptyInput,

  /// The partition did not account for every record or every agent. Should
  /// be unreachable.
  #[error("distribution invariant violated: {0}")]
  InvariantViolation(String),

  #[error("validation failed: {0}")]
  Validation(String),

  /// Another agent already holds this email (compared case-insensitively).
  #[error("Agent with this email already exists")]
  DuplicateEmail(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
