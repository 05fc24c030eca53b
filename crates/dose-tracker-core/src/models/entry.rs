//! Entry models: medicine doses and temperature readings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::medicine::MedicineRegistry;

/// Input validation errors, raised before anything reaches the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please fill in the required field based on the selected type: {0} is required")]
    MissingField(&'static str),

    #[error("Unknown medicine: {name}{}", suggestion_hint(.suggestion))]
    UnknownMedicine {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Temperature must be a positive number, got {0}")]
    InvalidTemperature(f64),

    #[error("Recorded time {0} is outside years 0000 to 9999")]
    InvalidTimestamp(DateTime<Utc>),

    #[error("Unknown entry type: {0}")]
    UnknownEntryType(String),

    #[error("Patient name must not be empty")]
    EmptyPatientName,
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean {}?)", s))
        .unwrap_or_default()
}

/// Discriminant stored in the `type` column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Medicine,
    Temperature,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Medicine => "medicine",
            EntryType::Temperature => "temperature",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "medicine" => Ok(EntryType::Medicine),
            "temperature" => Ok(EntryType::Temperature),
            other => Err(ValidationError::UnknownEntryType(other.to_string())),
        }
    }
}

/// What an entry records. Exactly one payload per entry type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryReading {
    /// A dose of a registry medicine
    Medicine { medicine: String },
    /// A temperature in degrees Fahrenheit
    Temperature { temperature: f64 },
}

impl EntryReading {
    pub fn entry_type(&self) -> EntryType {
        match self {
            EntryReading::Medicine { .. } => EntryType::Medicine,
            EntryReading::Temperature { .. } => EntryType::Temperature,
        }
    }

    pub fn medicine(&self) -> Option<&str> {
        match self {
            EntryReading::Medicine { medicine } => Some(medicine),
            EntryReading::Temperature { .. } => None,
        }
    }

    pub fn temperature(&self) -> Option<f64> {
        match self {
            EntryReading::Temperature { temperature } => Some(*temperature),
            EntryReading::Medicine { .. } => None,
        }
    }
}

/// A stored entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Database-assigned ID
    pub id: i64,
    /// Owning patient
    pub patient_id: i64,
    /// Dose or reading
    #[serde(flatten)]
    pub reading: EntryReading,
    /// When the dose was given or the reading taken
    pub recorded_at: DateTime<Utc>,
    /// Superseded by a later dose of the same medicine
    pub was_given: bool,
}

impl Entry {
    pub fn entry_type(&self) -> EntryType {
        self.reading.entry_type()
    }

    pub fn medicine(&self) -> Option<&str> {
        self.reading.medicine()
    }

    pub fn temperature(&self) -> Option<f64> {
        self.reading.temperature()
    }
}

/// A validated entry ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub patient_id: i64,
    pub reading: EntryReading,
    pub recorded_at: DateTime<Utc>,
}

/// Unvalidated entry fields as submitted by a client.
///
/// The type decides which of `medicine` / `temperature` is required; the
/// other one is dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntryInput {
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
    #[serde(default)]
    pub medicine: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl EntryInput {
    /// Convenience constructor for a medicine dose.
    pub fn medicine(name: impl Into<String>) -> Self {
        Self {
            entry_type: Some(EntryType::Medicine),
            medicine: Some(name.into()),
            ..Default::default()
        }
    }

    /// Convenience constructor for a temperature reading.
    pub fn temperature(value: f64) -> Self {
        Self {
            entry_type: Some(EntryType::Temperature),
            temperature: Some(value),
            ..Default::default()
        }
    }

    pub fn at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }

    /// Check the type-conditional fields against the registry, and that any
    /// recorded time fits the four-digit-year RFC 3339 form the store uses.
    pub fn validate(&self, registry: &MedicineRegistry) -> Result<EntryReading, ValidationError> {
        if let Some(recorded_at) = self.recorded_at {
            if !(0..=9999).contains(&recorded_at.year()) {
                return Err(ValidationError::InvalidTimestamp(recorded_at));
            }
        }
        let entry_type = self.entry_type.ok_or(ValidationError::MissingField("type"))?;
        match entry_type {
            EntryType::Medicine => {
                let name = self
                    .medicine
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or(ValidationError::MissingField("medicine"))?;
                if !registry.contains(name) {
                    return Err(ValidationError::UnknownMedicine {
                        name: name.to_string(),
                        suggestion: registry.suggest(name).map(str::to_string),
                    });
                }
                Ok(EntryReading::Medicine {
                    medicine: name.to_string(),
                })
            }
            EntryType::Temperature => {
                let temperature = self
                    .temperature
                    .ok_or(ValidationError::MissingField("temperature"))?;
                if !temperature.is_finite() || temperature <= 0.0 {
                    return Err(ValidationError::InvalidTemperature(temperature));
                }
                Ok(EntryReading::Temperature { temperature })
            }
        }
    }
}
