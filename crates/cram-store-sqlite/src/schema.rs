//! SQL schema for the Cram SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so future migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- `seq` preserves registration order; `user_id` is externally assigned.
CREATE TABLE IF NOT EXISTS users (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL UNIQUE,
    name        TEXT    NOT NULL,
    created_at  TEXT    NOT NULL    -- RFC 3339 UTC; never updated
);

-- One row per (user, day, task); writes overwrite in place.
CREATE TABLE IF NOT EXISTS completions (
    user_id       INTEGER NOT NULL,
    date          TEXT    NOT NULL,   -- YYYY-MM-DD, local calendar day
    task_id       TEXT    NOT NULL,   -- not constrained to the catalog
    completed     INTEGER NOT NULL DEFAULT 0,
    completed_at  TEXT,               -- set only while completed = 1
    UNIQUE (user_id, date, task_id)
);

CREATE TABLE IF NOT EXISTS streaks (
    user_id               INTEGER PRIMARY KEY,
    current_streak        INTEGER NOT NULL DEFAULT 0,
    best_streak           INTEGER NOT NULL DEFAULT 0,
    last_completion_date  TEXT,
    CHECK (best_streak >= current_streak)
);

CREATE INDEX IF NOT EXISTS completions_user_date_idx ON completions(user_id, date);

PRAGMA user_version = 1;
";
