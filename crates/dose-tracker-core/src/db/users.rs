//! User and session database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{constraint_error, from_db_time, to_db_time, Database, DbError, DbResult};
use crate::models::{Session, User};

impl Database {
    /// Insert a new user. A duplicate email (case-insensitive) is a
    /// `DbError::Constraint`.
    pub fn insert_user(&self, email: &str, password_hash: &str) -> DbResult<User> {
        let created_at = Utc::now();
        self.conn
            .execute(
                "INSERT INTO users (email, password_hash, created_at) VALUES (?1, ?2, ?3)",
                params![email, password_hash, to_db_time(&created_at)],
            )
            .map_err(constraint_error)?;
        Ok(User {
            id: self.conn.last_insert_rowid(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    /// Get a user by ID.
    pub fn get_user(&self, id: i64) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
                [id],
                UserRow::from_row,
            )
            .optional()?
            .map(User::try_from)
            .transpose()
    }

    /// Get a user by email, ignoring case.
    pub fn get_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
                [email],
                UserRow::from_row,
            )
            .optional()?
            .map(User::try_from)
            .transpose()
    }

    pub fn insert_session(&self, session: &Session) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    session.token_hash,
                    session.user_id,
                    to_db_time(&session.created_at),
                    to_db_time(&session.expires_at),
                ],
            )
            .map_err(constraint_error)?;
        Ok(())
    }

    /// Look up a session by token digest. Expired sessions are still returned.
    pub fn get_session(&self, token_hash: &str) -> DbResult<Option<Session>> {
        let row = self
            .conn
            .query_row(
                "SELECT token_hash, user_id, created_at, expires_at FROM sessions WHERE token_hash = ?",
                [token_hash],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(token_hash, user_id, created_at, expires_at)| -> DbResult<Session> {
            Ok(Session {
                token_hash,
                user_id,
                created_at: from_db_time(&created_at)?,
                expires_at: from_db_time(&expires_at)?,
            })
        })
        .transpose()
    }

    pub fn delete_session(&self, token_hash: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM sessions WHERE token_hash = ?", [token_hash])?;
        Ok(rows_affected > 0)
    }

    /// Remove every session that expired at or before `now`.
    pub fn delete_expired_sessions(&self, now: DateTime<Utc>) -> DbResult<usize> {
        let rows_affected = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?",
            [to_db_time(&now)],
        )?;
        Ok(rows_affected)
    }
}

struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(UserRow {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            created_at: from_db_time(&row.created_at)?,
        })
    }
}
