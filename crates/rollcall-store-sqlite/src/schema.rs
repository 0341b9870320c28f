//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,  -- normalised (trimmed, lowercase)
    password_hash TEXT NOT NULL,         -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- One row per user per weekday; subjects are embedded as a JSON array.
CREATE TABLE IF NOT EXISTS routine_entries (
    entry_id      TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    weekday       TEXT NOT NULL,         -- 'Monday' .. 'Sunday'
    subjects_json TEXT NOT NULL DEFAULT '[]',
    UNIQUE (user_id, weekday)
);

-- One row per user per calendar date; subjects kept in insertion order.
CREATE TABLE IF NOT EXISTS extra_sessions (
    session_id    TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    date          TEXT NOT NULL,         -- YYYY-MM-DD
    weekday       TEXT NOT NULL,
    subjects_json TEXT NOT NULL DEFAULT '[]',
    UNIQUE (user_id, date)
);

-- Subjects live inside JSON arrays, so there is no foreign key to them.
-- Existence is checked before every write.
CREATE TABLE IF NOT EXISTS attendance (
    record_id     TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    subject_key   TEXT NOT NULL,         -- 'id:<uuid>' | 'name:<name>'
    subject_name  TEXT NOT NULL,
    date          TEXT NOT NULL,         -- YYYY-MM-DD
    status        INTEGER NOT NULL,      -- 1 present, 0 absent
    updated_at    TEXT NOT NULL,
    UNIQUE (user_id, subject_key, date)
);

CREATE INDEX IF NOT EXISTS attendance_user_date_idx ON attendance(user_id, date);

PRAGMA user_version = 1;
";
