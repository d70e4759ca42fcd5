//! SQL schema for the jaunt SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The index columns (title, dates, updated_at) duplicate fields of the JSON
/// body so listings never decode full trip records; `save` keeps them in
/// lockstep with the body.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS trips (
    trip_id    TEXT PRIMARY KEY,
    title      TEXT NOT NULL,   -- index column, mirrors body
    start_date TEXT NOT NULL,   -- ISO 8601 calendar date
    end_date   TEXT NOT NULL,
    updated_at TEXT NOT NULL,   -- RFC 3339 UTC; stamped on every save
    body_json  TEXT NOT NULL    -- full persisted trip record
);

CREATE INDEX IF NOT EXISTS trips_updated_idx ON trips(updated_at);

PRAGMA user_version = 1;
";
