//! Server configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `DOSE_TRACKER__*` environment variables
//! (e.g. `DOSE_TRACKER__SERVER__PORT=8080`).

use ::config::{Config, ConfigError, Environment, File};
use dose_tracker_core::{MedicineConfig, MedicineRegistry, RegistryError};
use serde::Deserialize;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "DOSE_TRACKER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "dose-tracker.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    /// Replaces the built-in medicine table when present
    #[serde(default)]
    pub medicines: Option<Vec<MedicineSetting>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub session_ttl_hours: u32,
}

/// One `[[medicines]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct MedicineSetting {
    pub name: String,
    pub interval_hours: u32,
    #[serde(default)]
    pub pills: Option<u32>,
}

impl From<MedicineSetting> for MedicineConfig {
    fn from(setting: MedicineSetting) -> Self {
        MedicineConfig {
            name: setting.name,
            interval_hours: setting.interval_hours,
            pills: setting.pills,
        }
    }
}

impl Settings {
    /// Load from the file named by `DOSE_TRACKER_CONFIG`, or
    /// `dose-tracker.toml` in the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load with `path` as the (optional) config file.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "dose-tracker.db")?
            .set_default("auth.session_ttl_hours", 24 * 30)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("DOSE_TRACKER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// The configured medicine table, or the built-in one.
    pub fn registry(&self) -> Result<MedicineRegistry, RegistryError> {
        match &self.medicines {
            Some(medicines) => {
                MedicineRegistry::new(medicines.iter().cloned().map(Into::into).collect())
            }
            None => Ok(MedicineRegistry::default()),
        }
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.auth.session_ttl_hours))
    }
}
