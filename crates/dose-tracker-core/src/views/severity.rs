//! Temperature severity classification.

use serde::{Deserialize, Serialize};

/// Readings at or above this are high alert (°F).
pub const HIGH_ALERT_F: f64 = 102.0;
/// Readings at or above this are a warning (°F).
pub const WARNING_F: f64 = 100.0;

/// Display severity of a temperature reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureSeverity {
    Normal,
    Warning,
    HighAlert,
}

impl TemperatureSeverity {
    pub fn classify(fahrenheit: f64) -> Self {
        if fahrenheit >= HIGH_ALERT_F {
            TemperatureSeverity::HighAlert
        } else if fahrenheit >= WARNING_F {
            TemperatureSeverity::Warning
        } else {
            TemperatureSeverity::Normal
        }
    }
}
