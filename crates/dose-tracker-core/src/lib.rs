//! Dose Tracker Core Library
//!
//! Medicine dose and temperature tracking for caregivers.
//!
//! # Architecture
//!
//! ```text
//! MedicineRegistry (name → interval hours, pills)
//!         │
//!         ▼
//!   Dose Scheduler ◄──── entries ──── Entry Store ──┐
//!         │                                         │ patient_id
//!         ▼                                         ▼
//!   PatientTimeline                           Patient Store ── User
//!   (upcoming / past / temperatures)
//! ```
//!
//! # Core Principle
//!
//! **The registry is the single source of dosing intervals.** A medicine
//! missing from it gets no schedule, never a guessed default.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Entry, Patient, MedicineRegistry, User)
//! - [`schedule`]: Next-dose timing and the early-dose check
//! - [`views`]: Upcoming / past / temperature grouping
//! - [`auth`]: Password hashing and session tokens

pub mod auth;
pub mod db;
pub mod models;
pub mod schedule;
pub mod views;

// Re-export commonly used types
pub use auth::AuthError;
pub use db::{Database, DbError};
pub use models::{
    Entry, EntryInput, EntryReading, EntryType, IssuedToken, MedicineConfig, MedicineRegistry,
    NewEntry, Patient, RegistryError, Session, User, ValidationError,
};
pub use schedule::{DoseSchedule, EarlyDoseWarning};
pub use views::{PatientTimeline, TemperatureSeverity};

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

/// Default lifetime of a login session.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 30;

// =========================================================================
// Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

impl<T> From<std::sync::PoisonError<T>> for TrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        TrackerError::Lock(e.to_string())
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Use-case facade over the store, the registry and the scheduler.
///
/// Thread-safe: the connection sits behind a mutex that is never held
/// while hashing passwords.
pub struct DoseTracker {
    db: Mutex<Database>,
    registry: MedicineRegistry,
    session_ttl: Duration,
}

impl DoseTracker {
    pub fn new(db: Database, registry: MedicineRegistry) -> Self {
        Self {
            db: Mutex::new(db),
            registry,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P, registry: MedicineRegistry) -> TrackerResult<Self> {
        Ok(Self::new(Database::open(path)?, registry))
    }

    /// Create a tracker over an in-memory database (for testing).
    pub fn open_in_memory(registry: MedicineRegistry) -> TrackerResult<Self> {
        Ok(Self::new(Database::open_in_memory()?, registry))
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn registry(&self) -> &MedicineRegistry {
        &self.registry
    }

    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Register a new account.
    pub fn signup(&self, email: &str, password: &str) -> TrackerResult<User> {
        let email = auth::normalize_email(email)?;
        let password_hash = auth::hash_password(password)?;

        let db = self.db.lock()?;
        if db.get_user_by_email(&email)?.is_some() {
            return Err(TrackerError::Conflict(format!("{} is already registered", email)));
        }
        let user = db.insert_user(&email, &password_hash).map_err(|e| match e {
            DbError::Constraint(_) => {
                TrackerError::Conflict(format!("{} is already registered", email))
            }
            other => other.into(),
        })?;
        info!(user_id = user.id, "user signed up");
        Ok(user)
    }

    /// Check credentials and open a session.
    pub fn login(&self, email: &str, password: &str) -> TrackerResult<IssuedToken> {
        let email = auth::normalize_email(email)?;
        let user = self
            .db
            .lock()?
            .get_user_by_email(&email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !auth::verify_password(password, &user.password_hash) {
            warn!(user_id = user.id, "failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = auth::new_token();
        let now = Utc::now();
        let session = Session {
            token_hash: auth::hash_token(&token),
            user_id: user.id,
            created_at: now,
            expires_at: now + self.session_ttl,
        };

        let db = self.db.lock()?;
        let purged = db.delete_expired_sessions(now)?;
        if purged > 0 {
            debug!(purged, "removed expired sessions");
        }
        db.insert_session(&session)?;
        info!(user_id = user.id, "user logged in");

        Ok(IssuedToken {
            token,
            user_id: user.id,
            expires_at: session.expires_at,
        })
    }

    /// End the session for `token`. Returns whether a session existed.
    pub fn logout(&self, token: &str) -> TrackerResult<bool> {
        let removed = self.db.lock()?.delete_session(&auth::hash_token(token))?;
        if removed {
            info!("session ended");
        }
        Ok(removed)
    }

    /// Resolve a bearer token to its user.
    pub fn authenticate(&self, token: &str) -> TrackerResult<User> {
        let db = self.db.lock()?;
        let token_hash = auth::hash_token(token);
        let session = db
            .get_session(&token_hash)?
            .ok_or(AuthError::InvalidSession)?;

        if session.is_expired(Utc::now()) {
            db.delete_session(&token_hash)?;
            debug!(user_id = session.user_id, "rejected expired session");
            return Err(AuthError::InvalidSession.into());
        }

        db.get_user(session.user_id)?
            .ok_or_else(|| AuthError::InvalidSession.into())
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Create a patient owned by `owner`.
    pub fn create_patient(&self, owner: &User, name: &str) -> TrackerResult<Patient> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyPatientName.into());
        }
        let patient = self.db.lock()?.insert_patient(owner.id, name)?;
        info!(patient_id = patient.id, user_id = owner.id, "patient created");
        Ok(patient)
    }

    /// Patients owned by `owner`, oldest first.
    pub fn list_patients(&self, owner: &User) -> TrackerResult<Vec<Patient>> {
        Ok(self.db.lock()?.list_patients_for_user(owner.id)?)
    }

    pub fn get_patient(&self, id: i64) -> TrackerResult<Patient> {
        require_patient(&*self.db.lock()?, id)
    }

    /// Delete a patient together with all of its entries.
    pub fn delete_patient(&self, id: i64) -> TrackerResult<()> {
        if !self.db.lock()?.delete_patient(id)? {
            return Err(TrackerError::NotFound(format!("patient {}", id)));
        }
        info!(patient_id = id, "patient deleted");
        Ok(())
    }

    // =========================================================================
    // Entry Operations
    // =========================================================================

    /// A patient's entries, newest first.
    pub fn list_entries(&self, patient_id: i64) -> TrackerResult<Vec<Entry>> {
        let db = self.db.lock()?;
        require_patient(&db, patient_id)?;
        Ok(db.list_entries_for_patient(patient_id)?)
    }

    /// Validate and store an entry. A missing time means "now".
    pub fn create_entry(&self, patient_id: i64, input: &EntryInput) -> TrackerResult<Entry> {
        let reading = input.validate(&self.registry)?;
        let new_entry = NewEntry {
            patient_id,
            reading,
            recorded_at: input.recorded_at.unwrap_or_else(Utc::now),
        };

        let db = self.db.lock()?;
        require_patient(&db, patient_id)?;
        let entry = db.insert_entry(&new_entry)?;
        info!(
            entry_id = entry.id,
            patient_id,
            entry_type = %entry.entry_type(),
            "entry created"
        );
        Ok(entry)
    }

    /// Record a dose of `medicine` given right now.
    pub fn record_dose(&self, patient_id: i64, medicine: &str) -> TrackerResult<Entry> {
        self.create_entry(patient_id, &EntryInput::medicine(medicine).at(Utc::now()))
    }

    /// Overwrite an entry's type, payload and time.
    pub fn update_entry(&self, id: i64, input: &EntryInput) -> TrackerResult<Entry> {
        let reading = input.validate(&self.registry)?;
        let recorded_at = input
            .recorded_at
            .ok_or(ValidationError::MissingField("recordedAt"))?;

        let entry = self
            .db
            .lock()?
            .update_entry(id, &reading, recorded_at)?
            .ok_or_else(|| TrackerError::NotFound(format!("entry {}", id)))?;
        info!(entry_id = id, patient_id = entry.patient_id, "entry updated");
        Ok(entry)
    }

    /// Delete an entry. Returns the owning patient's ID, or `None` if the
    /// entry was already gone.
    pub fn delete_entry(&self, id: i64) -> TrackerResult<Option<i64>> {
        let patient_id = self.db.lock()?.delete_entry(id)?;
        match patient_id {
            Some(patient_id) => info!(entry_id = id, patient_id, "entry deleted"),
            None => debug!(entry_id = id, "entry already deleted"),
        }
        Ok(patient_id)
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Upcoming / past / temperature views of a patient at `now`.
    pub fn timeline(&self, patient_id: i64, now: DateTime<Utc>) -> TrackerResult<PatientTimeline> {
        let entries = self.list_entries(patient_id)?;
        Ok(PatientTimeline::build(&entries, &self.registry, now))
    }

    /// Advisory warning if a dose of `medicine` at `now` would be early.
    pub fn early_dose_check(
        &self,
        patient_id: i64,
        medicine: &str,
        now: DateTime<Utc>,
    ) -> TrackerResult<Option<EarlyDoseWarning>> {
        let medicine = medicine.trim();
        if !self.registry.contains(medicine) {
            return Err(ValidationError::UnknownMedicine {
                name: medicine.to_string(),
                suggestion: self.registry.suggest(medicine).map(str::to_string),
            }
            .into());
        }
        let entries = self.list_entries(patient_id)?;
        Ok(schedule::check_early_dose(&entries, medicine, &self.registry, now))
    }
}

fn require_patient(db: &Database, id: i64) -> TrackerResult<Patient> {
    db.get_patient(id)?
        .ok_or_else(|| TrackerError::NotFound(format!("patient {}", id)))
}
