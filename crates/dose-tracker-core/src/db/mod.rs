//! Database layer for the dose tracker.

mod entries;
mod patients;
mod schema;
mod users;

pub use schema::*;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub(crate) fn to_db_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn from_db_time(text: &str) -> DbResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc))
}

/// Turn UNIQUE / CHECK / FOREIGN KEY failures into `DbError::Constraint`.
pub(crate) fn constraint_error(err: rusqlite::Error) -> DbError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            DbError::Constraint(message.clone().unwrap_or_else(|| failure.to_string()))
        }
        _ => DbError::Sqlite(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"sessions".to_string()));
        assert!(tables.contains(&"patients".to_string()));
        assert!(tables.contains(&"entries".to_string()));
    }

    #[test]
    fn test_open_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.db");

        {
            let db = Database::open(&path).unwrap();
            db.insert_user("a@example.com", "hash").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert!(db.get_user_by_email("a@example.com").unwrap().is_some());
    }

    #[test]
    fn test_db_time_orders_lexically() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let late = early + chrono::Duration::milliseconds(1);
        assert!(to_db_time(&early) < to_db_time(&late));
        assert_eq!(from_db_time(&to_db_time(&late)).unwrap(), late);
    }
}
