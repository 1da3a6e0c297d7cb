//! SQL schema for the docq SQLite store.
//!
//! Executed at every connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! `user_id` columns reference `users(id)`, but foreign key checks are
//! switched off explicitly (the bundled SQLite enables them by default):
//! passing a valid owner is the caller's job.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = OFF;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL    -- argon2 PHC string
);

-- Documents are never updated or deleted.
CREATE TABLE IF NOT EXISTS documents (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id  INTEGER NOT NULL REFERENCES users(id),
    filename TEXT NOT NULL,
    content  BLOB,             -- uploaded bytes, verbatim
    format   TEXT NOT NULL     -- declared MIME type or extension
);

-- Append-only.
CREATE TABLE IF NOT EXISTS user_history (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id   INTEGER NOT NULL REFERENCES users(id),
    query     TEXT NOT NULL,
    response  TEXT NOT NULL,   -- at most 500 characters
    timestamp TEXT NOT NULL    -- RFC 3339 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS user_history_user_idx ON user_history(user_id);

PRAGMA user_version = 1;
";
