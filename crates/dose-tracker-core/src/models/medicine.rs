//! Medicine registry models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Registry configuration errors.
#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("Medicine name must not be empty")]
    EmptyName,

    #[error("Dosing interval for {0} must be at least one hour")]
    ZeroInterval(String),

    #[error("Medicine listed twice: {0}")]
    Duplicate(String),
}

/// A single medicine the caregiver can log doses of.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineConfig {
    /// Display name, also the key stored on entries
    pub name: String,
    /// Hours that must elapse before the next dose
    pub interval_hours: u32,
    /// Pills per dose, when the medicine comes in tablets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pills: Option<u32>,
}

impl MedicineConfig {
    /// Create a registry entry without a pill count.
    pub fn new(name: impl Into<String>, interval_hours: u32) -> Self {
        Self {
            name: name.into(),
            interval_hours,
            pills: None,
        }
    }

    /// Set the pill count.
    pub fn with_pills(mut self, pills: u32) -> Self {
        self.pills = Some(pills);
        self
    }
}

/// Immutable lookup from medicine name to dosing interval.
///
/// Built once at startup and shared by reference; every component that
/// needs an interval goes through this map.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicineRegistry {
    medicines: BTreeMap<String, MedicineConfig>,
}

impl MedicineRegistry {
    /// Build a registry, rejecting empty names, zero intervals and duplicates.
    pub fn new(medicines: Vec<MedicineConfig>) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();
        for medicine in medicines {
            let name = medicine.name.trim();
            if name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if medicine.interval_hours == 0 {
                return Err(RegistryError::ZeroInterval(name.to_string()));
            }
            let key = name.to_string();
            if map.contains_key(&key) {
                return Err(RegistryError::Duplicate(key));
            }
            map.insert(
                key.clone(),
                MedicineConfig {
                    name: key,
                    ..medicine
                },
            );
        }
        Ok(Self { medicines: map })
    }

    /// Look up a medicine by its exact name.
    pub fn get(&self, name: &str) -> Option<&MedicineConfig> {
        self.medicines.get(name)
    }

    /// Dosing interval for a medicine, if it is known.
    pub fn interval_hours(&self, name: &str) -> Option<u32> {
        self.get(name).map(|m| m.interval_hours)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.medicines.contains_key(name)
    }

    /// All medicines in name order.
    pub fn iter(&self) -> impl Iterator<Item = &MedicineConfig> {
        self.medicines.values()
    }

    pub fn len(&self) -> usize {
        self.medicines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medicines.is_empty()
    }

    /// Closest known medicine name, for "did you mean" hints.
    pub fn suggest(&self, name: &str) -> Option<&str> {
        let needle = name.trim().to_lowercase();
        self.medicines
            .keys()
            .map(|known| (known, strsim::jaro_winkler(&needle, &known.to_lowercase())))
            .filter(|(_, score)| *score >= 0.8)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(known, _)| known.as_str())
    }
}

impl Default for MedicineRegistry {
    fn default() -> Self {
        let medicines = vec![
            MedicineConfig::new("Motrin", 6),
            MedicineConfig::new("Tylenol", 4),
            MedicineConfig::new("Cough Medicine", 4),
            MedicineConfig::new("SMZ", 12),
            MedicineConfig::new("Gabapentin", 8),
            MedicineConfig::new("Lorazepam", 8),
            MedicineConfig::new("Hydromorphone", 3),
            MedicineConfig::new("Clindamycin", 6).with_pills(2),
            MedicineConfig::new("Zyrtec", 24),
            MedicineConfig::new("Mucinex (Kids)", 4),
        ];
        Self {
            medicines: medicines
                .into_iter()
                .map(|m| (m.name.clone(), m))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = MedicineRegistry::default();
        assert_eq!(registry.interval_hours("Motrin"), Some(6));
        assert_eq!(registry.interval_hours("Tylenol"), Some(4));
        assert_eq!(registry.get("Clindamycin").unwrap().pills, Some(2));
        assert_eq!(registry.interval_hours("Aspirin"), None);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let result = MedicineRegistry::new(vec![MedicineConfig::new("Motrin", 0)]);
        assert_eq!(result, Err(RegistryError::ZeroInterval("Motrin".into())));
    }

    #[test]
    fn test_rejects_duplicates_and_empty_names() {
        let result = MedicineRegistry::new(vec![
            MedicineConfig::new("Motrin", 6),
            MedicineConfig::new(" Motrin ", 4),
        ]);
        assert_eq!(result, Err(RegistryError::Duplicate("Motrin".into())));

        let result = MedicineRegistry::new(vec![MedicineConfig::new("  ", 4)]);
        assert_eq!(result, Err(RegistryError::EmptyName));
    }

    #[test]
    fn test_names_are_trimmed() {
        let registry = MedicineRegistry::new(vec![MedicineConfig::new(" Zyrtec ", 24)]).unwrap();
        assert!(registry.contains("Zyrtec"));
        assert_eq!(registry.get("Zyrtec").unwrap().name, "Zyrtec");
    }

    #[test]
    fn test_suggest() {
        let registry = MedicineRegistry::default();
        assert_eq!(registry.suggest("motrn"), Some("Motrin"));
        assert_eq!(registry.suggest("tylenol"), Some("Tylenol"));
        assert_eq!(registry.suggest("xyz"), None);
    }

    #[test]
    fn test_iter_is_name_ordered() {
        let registry = MedicineRegistry::default();
        let names: Vec<_> = registry.iter().map(|m| m.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(registry.len(), 10);
    }
}
