//! Dose scheduling.
//!
//! Pure functions over entries and the medicine registry. Nothing here
//! touches the database; callers pass `now` explicitly.

mod early;
mod timing;

pub use early::*;
pub use timing::*;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{Entry, MedicineRegistry};

/// Schedule for a medicine entry, or `None` for temperatures and
/// medicines missing from the registry.
pub fn schedule_for(
    entry: &Entry,
    registry: &MedicineRegistry,
    now: DateTime<Utc>,
) -> Option<DoseSchedule> {
    let interval = registry.interval_hours(entry.medicine()?)?;
    Some(DoseSchedule::compute(entry.recorded_at, interval, now))
}

/// Most recently recorded dose of `medicine`.
pub fn latest_dose<'a>(entries: &'a [Entry], medicine: &str) -> Option<&'a Entry> {
    entries
        .iter()
        .filter(|e| e.medicine() == Some(medicine))
        .max_by_key(|e| (e.recorded_at, e.id))
}

/// Latest dose per distinct medicine name, keyed by name.
pub fn latest_doses(entries: &[Entry]) -> BTreeMap<&str, &Entry> {
    let mut latest: BTreeMap<&str, &Entry> = BTreeMap::new();
    for entry in entries {
        let Some(medicine) = entry.medicine() else {
            continue;
        };
        let newer = latest.get(medicine).map_or(true, |current| {
            (entry.recorded_at, entry.id) > (current.recorded_at, current.id)
        });
        if newer {
            latest.insert(medicine, entry);
        }
    }
    latest
}
