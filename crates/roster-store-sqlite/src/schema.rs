//! SQL schema for the roster SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for later migrations.

pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS barangays (
    barangay_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    student_id  TEXT PRIMARY KEY,
    lrn         TEXT NOT NULL,
    name        TEXT NOT NULL,      -- display form, derived from the parts
    last_name   TEXT NOT NULL,
    first_name  TEXT NOT NULL,
    middle_name TEXT NOT NULL DEFAULT '',
    gender      TEXT CHECK (gender IN ('male', 'female')),
    birthday    TEXT,               -- YYYY-MM-DD
    address     TEXT,
    barangay_id TEXT NOT NULL REFERENCES barangays(barangay_id),
    assessment  TEXT NOT NULL DEFAULT '',
    image       TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'inactive', 'graduated')),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS students_status_idx   ON students(status);
CREATE INDEX IF NOT EXISTS students_barangay_idx ON students(barangay_id);

PRAGMA user_version = 1;
";
