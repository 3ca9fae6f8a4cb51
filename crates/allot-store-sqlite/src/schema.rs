//! SQL schema for the allot SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Roster order is insertion order (rowid).
CREATE TABLE IF NOT EXISTS agents (
    agent_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    mobile      TEXT NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);

-- Snapshots are written once, in a single transaction, and never updated.
CREATE TABLE IF NOT EXISTS distributions (
    distribution_id TEXT PRIMARY KEY,
    file_name       TEXT NOT NULL,
    uploaded_at     TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    total_records   INTEGER NOT NULL
);

-- agent_id is a frozen copy, not a reference into agents.
CREATE TABLE IF NOT EXISTS assignments (
    distribution_id TEXT NOT NULL
                    REFERENCES distributions(distribution_id) ON DELETE CASCADE,
    position        INTEGER NOT NULL,
    agent_id        TEXT NOT NULL,
    agent_name      TEXT NOT NULL,
    record_count    INTEGER NOT NULL,
    PRIMARY KEY (distribution_id, position)
);

CREATE TABLE IF NOT EXISTS assignment_records (
    distribution_id     TEXT NOT NULL,
    assignment_position INTEGER NOT NULL,
    position            INTEGER NOT NULL,
    first_name          TEXT NOT NULL,
    phone               TEXT NOT NULL,
    notes               TEXT NOT NULL,
    PRIMARY KEY (distribution_id, assignment_position, position),
    FOREIGN KEY (distribution_id, assignment_position)
        REFERENCES assignments(distribution_id, position) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS distributions_uploaded_idx ON distributions(uploaded_at);

PRAGMA user_version = 1;
";
