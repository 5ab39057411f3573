//! SQL schema for the Tassel SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    subject_id TEXT PRIMARY KEY,
    reg_no     TEXT NOT NULL UNIQUE,  -- immutable natural key
    full_name  TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Artifacts are strictly append-only.
-- No UPDATE is ever issued against this table; rows disappear only through
-- the subject-delete cascade.
CREATE TABLE IF NOT EXISTS artifacts (
    artifact_id  TEXT PRIMARY KEY,
    subject_id   TEXT NOT NULL REFERENCES subjects(subject_id) ON DELETE CASCADE,
    kind         TEXT NOT NULL,           -- ArtifactKind discriminant
    storage_key  TEXT NOT NULL UNIQUE,    -- opaque blob store path
    file_url     TEXT NOT NULL,
    file_name    TEXT NOT NULL,
    file_size    INTEGER NOT NULL,
    content_type TEXT NOT NULL,
    created_at   TEXT NOT NULL            -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS operators (
    username   TEXT PRIMARY KEY,
    credential TEXT NOT NULL  -- JSON-encoded Credential (hashed | legacy)
);

CREATE INDEX IF NOT EXISTS artifacts_subject_idx ON artifacts(subject_id);
CREATE INDEX IF NOT EXISTS artifacts_latest_idx
    ON artifacts(subject_id, kind, created_at);

PRAGMA user_version = 1;
";
