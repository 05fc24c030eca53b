//! Advisory check for doses given before the interval has elapsed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{latest_dose, DoseSchedule};
use crate::models::{Entry, MedicineRegistry};

/// Warning shown before a caregiver confirms an early dose.
///
/// Purely informational: the store accepts early doses.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EarlyDoseWarning {
    pub medicine: String,
    /// Entry the schedule was computed from
    pub last_dose_id: i64,
    pub last_dose_at: DateTime<Utc>,
    pub next_dose_time: DateTime<Utc>,
    pub minutes_remaining: i64,
    /// Human-readable warning; times are rendered in UTC
    pub message: String,
}

/// Return a warning if giving `medicine` at `now` would be early.
///
/// No warning is produced for unknown medicines or for a first dose.
pub fn check_early_dose(
    entries: &[Entry],
    medicine: &str,
    registry: &MedicineRegistry,
    now: DateTime<Utc>,
) -> Option<EarlyDoseWarning> {
    let interval = registry.interval_hours(medicine)?;
    let last = latest_dose(entries, medicine)?;
    let schedule = DoseSchedule::compute(last.recorded_at, interval, now);
    if !schedule.is_early(now) {
        return None;
    }

    let remaining = schedule
        .time_remaining_label()
        .unwrap_or_else(|| "less than a minute remaining".to_string());
    Some(EarlyDoseWarning {
        medicine: medicine.to_string(),
        last_dose_id: last.id,
        last_dose_at: last.recorded_at,
        next_dose_time: schedule.next_dose_time,
        minutes_remaining: schedule.minutes_remaining,
        message: format!(
            "{} is not due until {} ({}). Giving medication too early can be dangerous.",
            medicine,
            schedule.next_dose_time.format("%H:%M UTC"),
            remaining
        ),
    })
}
