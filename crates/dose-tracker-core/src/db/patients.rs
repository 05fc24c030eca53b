//! Patient database operations.

use rusqlite::{params, OptionalExtension};

use super::{constraint_error, Database, DbResult};
use crate::models::Patient;

impl Database {
    /// Insert a new patient owned by `user_id`.
    pub fn insert_patient(&self, user_id: i64, name: &str) -> DbResult<Patient> {
        self.conn
            .execute(
                "INSERT INTO patients (user_id, name) VALUES (?1, ?2)",
                params![user_id, name],
            )
            .map_err(constraint_error)?;
        Ok(Patient {
            id: self.conn.last_insert_rowid(),
            user_id,
            name: name.to_string(),
        })
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                "SELECT id, user_id, name FROM patients WHERE id = ?",
                [id],
                |row| {
                    Ok(Patient {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        name: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List a user's patients in creation order.
    pub fn list_patients_for_user(&self, user_id: i64) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, name
            FROM patients
            WHERE user_id = ?
            ORDER BY id ASC
            "#,
        )?;

        let rows = stmt.query_map([user_id], |row| {
            Ok(Patient {
                id: row.get(0)?,
                user_id: row.get(1)?,
                name: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a patient and, through the foreign key, all of its entries.
    pub fn delete_patient(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
