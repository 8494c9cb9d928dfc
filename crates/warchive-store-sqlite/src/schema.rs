//! SQL schema for the Warchive SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS war_records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    start_year  TEXT NOT NULL,   -- years travel as text on the wire
    end_year    TEXT,
    description TEXT NOT NULL,
    file_name   TEXT             -- generated attachment name, NULL if none
);

PRAGMA user_version = 1;
";
