//! SQLite schema definition.

/// Complete database schema for the dose tracker.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Accounts
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Only SHA-256 digests of session tokens are stored
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_patients_user ON patients(user_id);

-- ============================================================================
-- Entries (medicine doses and temperature readings)
-- ============================================================================

CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    type TEXT NOT NULL CHECK (type IN ('medicine', 'temperature')),
    medicine TEXT,
    temperature REAL,
    recorded_at TEXT NOT NULL,                   -- RFC 3339, UTC, fixed nanosecond width
    was_given INTEGER NOT NULL DEFAULT 0,
    CHECK (
        (type = 'medicine' AND medicine IS NOT NULL AND temperature IS NULL)
        OR (type = 'temperature' AND temperature IS NOT NULL AND medicine IS NULL)
    )
);

CREATE INDEX IF NOT EXISTS idx_entries_patient ON entries(patient_id, recorded_at);
CREATE INDEX IF NOT EXISTS idx_entries_medicine ON entries(patient_id, medicine);
"#;
