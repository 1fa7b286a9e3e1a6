//! SQL schema for the datareq SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Rows are never deleted. After insertion only `status` is updated.
CREATE TABLE IF NOT EXISTS requests (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    requester_name   TEXT NOT NULL,
    requester_email  TEXT NOT NULL,
    request_type     TEXT NOT NULL,   -- '<authorized_by>:<authorized_email>'
    requested_date   TEXT NOT NULL,   -- caller-supplied, not validated
    authorized_by    TEXT NOT NULL,   -- derived from request_type at insert
    authorized_email TEXT NOT NULL,   -- derived from request_type at insert
    notes            TEXT,
    status           TEXT NOT NULL DEFAULT 'Pending',  -- 'Pending' | 'Approved' | 'Rejected'
    created_at       TEXT NOT NULL    -- RFC 3339 UTC; store-assigned
);

PRAGMA user_version = 1;
";
