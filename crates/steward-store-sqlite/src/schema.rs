//! SQL schema for the steward SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One physical collection for both record kinds.
-- Rows are strictly append-only: no UPDATE or DELETE is ever issued.
CREATE TABLE IF NOT EXISTS records (
    record_id  TEXT PRIMARY KEY,
    kind       TEXT NOT NULL,   -- 'serviceRequest' | 'asset'
    owner_id   TEXT,            -- session id; NULL for service requests
    created_at TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    payload    TEXT NOT NULL    -- JSON payload (kind-specific fields)
);

CREATE INDEX IF NOT EXISTS records_kind_idx    ON records(kind);
CREATE INDEX IF NOT EXISTS records_owner_idx   ON records(owner_id);
CREATE INDEX IF NOT EXISTS records_created_idx ON records(created_at);

PRAGMA user_version = 1;
";
