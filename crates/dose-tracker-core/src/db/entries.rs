//! Entry database operations.
//!
//! `was_given` is maintained here: after any change to a medicine entry the
//! flags for that patient and medicine are recomputed, so an entry is marked
//! given exactly when a later dose of the same medicine exists.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{constraint_error, from_db_time, to_db_time, Database, DbError, DbResult};
use crate::models::{Entry, EntryReading, EntryType, NewEntry};

const SELECT_ENTRY: &str = r#"
    SELECT id, patient_id, type, medicine, temperature, recorded_at, was_given
    FROM entries
"#;

impl Database {
    /// Insert an entry and return it as stored.
    pub fn insert_entry(&self, entry: &NewEntry) -> DbResult<Entry> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r#"
            INSERT INTO entries (patient_id, type, medicine, temperature, recorded_at, was_given)
            VALUES (?1, ?2, ?3, ?4, ?5, 0)
            "#,
            params![
                entry.patient_id,
                entry.reading.entry_type().as_str(),
                entry.reading.medicine(),
                entry.reading.temperature(),
                to_db_time(&entry.recorded_at),
            ],
        )
        .map_err(constraint_error)?;
        let id = tx.last_insert_rowid();

        if let Some(medicine) = entry.reading.medicine() {
            refresh_given_flags(&tx, entry.patient_id, medicine)?;
        }

        let stored = get_entry(&tx, id)?
            .ok_or_else(|| DbError::NotFound(format!("entry {}", id)))?;
        tx.commit()?;
        Ok(stored)
    }

    /// Get an entry by ID.
    pub fn get_entry(&self, id: i64) -> DbResult<Option<Entry>> {
        get_entry(&self.conn, id)
    }

    /// All entries for a patient, newest first.
    pub fn list_entries_for_patient(&self, patient_id: i64) -> DbResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE patient_id = ? ORDER BY recorded_at DESC, id DESC",
            SELECT_ENTRY
        ))?;

        let rows = stmt.query_map([patient_id], EntryRow::from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(Entry::try_from(row?)?);
        }
        Ok(entries)
    }

    /// Overwrite type, payload and time of an entry.
    ///
    /// Returns `None` when no entry has this ID.
    pub fn update_entry(
        &self,
        id: i64,
        reading: &EntryReading,
        recorded_at: DateTime<Utc>,
    ) -> DbResult<Option<Entry>> {
        let tx = self.conn.unchecked_transaction()?;
        let Some(previous) = get_entry(&tx, id)? else {
            return Ok(None);
        };

        tx.execute(
            r#"
            UPDATE entries SET
                type = ?2,
                medicine = ?3,
                temperature = ?4,
                recorded_at = ?5,
                was_given = 0
            WHERE id = ?1
            "#,
            params![
                id,
                reading.entry_type().as_str(),
                reading.medicine(),
                reading.temperature(),
                to_db_time(&recorded_at),
            ],
        )
        .map_err(constraint_error)?;

        if let Some(medicine) = previous.medicine() {
            refresh_given_flags(&tx, previous.patient_id, medicine)?;
        }
        if let Some(medicine) = reading.medicine() {
            if previous.medicine() != Some(medicine) {
                refresh_given_flags(&tx, previous.patient_id, medicine)?;
            }
        }

        let stored = get_entry(&tx, id)?;
        tx.commit()?;
        Ok(stored)
    }

    /// Delete an entry, returning the owning patient's ID if a row was removed.
    pub fn delete_entry(&self, id: i64) -> DbResult<Option<i64>> {
        let tx = self.conn.unchecked_transaction()?;
        let Some(previous) = get_entry(&tx, id)? else {
            return Ok(None);
        };

        tx.execute("DELETE FROM entries WHERE id = ?", [id])?;
        if let Some(medicine) = previous.medicine() {
            refresh_given_flags(&tx, previous.patient_id, medicine)?;
        }
        tx.commit()?;
        Ok(Some(previous.patient_id))
    }
}

fn get_entry(conn: &Connection, id: i64) -> DbResult<Option<Entry>> {
    conn.query_row(&format!("{} WHERE id = ?", SELECT_ENTRY), [id], EntryRow::from_row)
        .optional()?
        .map(Entry::try_from)
        .transpose()
}

/// Recompute `was_given` for one patient's doses of one medicine.
fn refresh_given_flags(conn: &Connection, patient_id: i64, medicine: &str) -> DbResult<usize> {
    let updated = conn.execute(
        r#"
        UPDATE entries SET was_given = EXISTS (
            SELECT 1 FROM entries AS later
            WHERE later.patient_id = entries.patient_id
              AND later.type = 'medicine'
              AND later.medicine = entries.medicine
              AND (later.recorded_at > entries.recorded_at
                   OR (later.recorded_at = entries.recorded_at AND later.id > entries.id))
        )
        WHERE patient_id = ?1 AND type = 'medicine' AND medicine = ?2
        "#,
        params![patient_id, medicine],
    )?;
    Ok(updated)
}

/// Intermediate row struct for database mapping.
struct EntryRow {
    id: i64,
    patient_id: i64,
    entry_type: String,
    medicine: Option<String>,
    temperature: Option<f64>,
    recorded_at: String,
    was_given: bool,
}

impl EntryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(EntryRow {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            entry_type: row.get(2)?,
            medicine: row.get(3)?,
            temperature: row.get(4)?,
            recorded_at: row.get(5)?,
            was_given: row.get(6)?,
        })
    }
}

impl TryFrom<EntryRow> for Entry {
    type Error = DbError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let entry_type: EntryType = row
            .entry_type
            .parse()
            .map_err(|e| DbError::Constraint(format!("entry {}: {}", row.id, e)))?;
        let reading = match (entry_type, row.medicine, row.temperature) {
            (EntryType::Medicine, Some(medicine), None) => EntryReading::Medicine { medicine },
            (EntryType::Temperature, None, Some(temperature)) => {
                EntryReading::Temperature { temperature }
            }
            _ => {
                return Err(DbError::Constraint(format!(
                    "entry {} payload does not match type {}",
                    row.id, entry_type
                )))
            }
        };

        Ok(Entry {
            id: row.id,
            patient_id: row.patient_id,
            reading,
            recorded_at: from_db_time(&row.recorded_at)?,
            was_given: row.was_given,
        })
    }
}
