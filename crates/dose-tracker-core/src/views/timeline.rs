//! Upcoming / past / temperature views of a patient's entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::severity::TemperatureSeverity;
use crate::models::{Entry, MedicineRegistry};
use crate::schedule::{latest_doses, schedule_for, DoseSchedule};

/// Next dose of one medicine, derived from its latest entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDose {
    pub medicine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pills: Option<u32>,
    pub last_dose: Entry,
    pub schedule: DoseSchedule,
    /// "Due at HH:MM UTC" once overdue, otherwise "Ready after HH:MM UTC".
    /// Clients showing local time format `schedule.next_dose_time` themselves.
    pub status_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<String>,
}

/// A medicine entry in the history list.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PastDose {
    pub entry: Entry,
    /// Absent when the medicine is no longer in the registry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<DoseSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureReading {
    pub entry: Entry,
    pub temperature: f64,
    pub severity: TemperatureSeverity,
}

/// Everything a patient page shows, computed at `generated_at`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientTimeline {
    pub generated_at: DateTime<Utc>,
    pub upcoming: Vec<UpcomingDose>,
    pub past: Vec<PastDose>,
    pub temperatures: Vec<TemperatureReading>,
}

impl PatientTimeline {
    /// Group a patient's entries into the three views.
    pub fn build(entries: &[Entry], registry: &MedicineRegistry, now: DateTime<Utc>) -> Self {
        let mut upcoming: Vec<UpcomingDose> = latest_doses(entries)
            .into_iter()
            .filter_map(|(medicine, last)| {
                let config = registry.get(medicine)?;
                let schedule = DoseSchedule::compute(last.recorded_at, config.interval_hours, now);
                let time = schedule.next_dose_time.format("%H:%M UTC");
                let status_label = if schedule.is_overdue {
                    format!("Due at {}", time)
                } else {
                    format!("Ready after {}", time)
                };
                Some(UpcomingDose {
                    medicine: medicine.to_string(),
                    pills: config.pills,
                    last_dose: last.clone(),
                    time_remaining: schedule.time_remaining_label(),
                    schedule,
                    status_label,
                })
            })
            .collect();
        upcoming.sort_by(|a, b| {
            a.schedule
                .minutes_remaining
                .cmp(&b.schedule.minutes_remaining)
                .then(a.last_dose.recorded_at.cmp(&b.last_dose.recorded_at))
                .then_with(|| a.medicine.cmp(&b.medicine))
        });

        let mut past: Vec<PastDose> = entries
            .iter()
            .filter(|e| e.medicine().is_some())
            .map(|entry| {
                let schedule = schedule_for(entry, registry, now);
                PastDose {
                    entry: entry.clone(),
                    time_remaining: schedule.as_ref().and_then(DoseSchedule::time_remaining_label),
                    schedule,
                }
            })
            .collect();
        past.sort_by(|a, b| newest_first(&a.entry, &b.entry));

        let mut temperatures: Vec<TemperatureReading> = entries
            .iter()
            .filter_map(|entry| {
                let temperature = entry.temperature()?;
                Some(TemperatureReading {
                    entry: entry.clone(),
                    temperature,
                    severity: TemperatureSeverity::classify(temperature),
                })
            })
            .collect();
        temperatures.sort_by(|a, b| newest_first(&a.entry, &b.entry));

        Self {
            generated_at: now,
            upcoming,
            past,
            temperatures,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.past.is_empty() && self.temperatures.is_empty()
    }
}

fn newest_first(a: &Entry, b: &Entry) -> std::cmp::Ordering {
    b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id))
}
