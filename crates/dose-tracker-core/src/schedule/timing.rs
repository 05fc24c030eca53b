//! Next-dose arithmetic.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Derived timing for a single dose.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoseSchedule {
    /// When the dose was given
    pub recorded_at: DateTime<Utc>,
    /// Hours between doses
    pub interval_hours: u32,
    /// `recorded_at + interval_hours`
    pub next_dose_time: DateTime<Utc>,
    /// Whole minutes until the next dose, truncated toward zero; negative once due
    pub minutes_remaining: i64,
    /// `now > next_dose_time`
    pub is_overdue: bool,
}

impl DoseSchedule {
    /// Compute the schedule as seen at `now`.
    pub fn compute(recorded_at: DateTime<Utc>, interval_hours: u32, now: DateTime<Utc>) -> Self {
        let next_dose_time = next_dose_time(recorded_at, interval_hours);
        Self {
            recorded_at,
            interval_hours,
            next_dose_time,
            minutes_remaining: (next_dose_time - now).num_minutes(),
            is_overdue: now > next_dose_time,
        }
    }

    /// `"{h}h {m}m remaining"` while minutes remain, otherwise `None`.
    pub fn time_remaining_label(&self) -> Option<String> {
        if self.minutes_remaining > 0 {
            Some(format!("{} remaining", hours_minutes(self.minutes_remaining)))
        } else {
            None
        }
    }

    /// `"Overdue by {h}h {m}m"` once the next dose time has passed.
    pub fn overdue_label(&self) -> Option<String> {
        if self.is_overdue {
            Some(format!("Overdue by {}", hours_minutes(self.minutes_remaining)))
        } else {
            None
        }
    }

    /// Whether a dose given at `now` would come before the interval elapsed.
    pub fn is_early(&self, now: DateTime<Utc>) -> bool {
        now < self.next_dose_time
    }
}

/// `recorded_at` plus the interval, exactly.
pub fn next_dose_time(recorded_at: DateTime<Utc>, interval_hours: u32) -> DateTime<Utc> {
    recorded_at + Duration::hours(i64::from(interval_hours))
}

fn hours_minutes(minutes: i64) -> String {
    let abs = minutes.unsigned_abs();
    format!("{}h {}m", abs / 60, abs % 60)
}
