use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::model::{City, TemperatureUnit};

pub const DEFAULT_BASE_URL: &str = "https://weatherapi.pelmorex.com/api/v1/observation/placecode";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SUBMISSION_DELAY_MS: u64 = 1500;

/// Settings for the weather endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), timeout_secs: DEFAULT_TIMEOUT_SECS }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub submission_delay_ms: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self { submission_delay_ms: DEFAULT_SUBMISSION_DELAY_MS }
    }
}

impl ContactConfig {
    pub fn submission_delay(&self) -> Duration {
        Duration::from_millis(self.submission_delay_ms)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// last_city = "CAON0696"
/// preferred_unit = "metric"
///
/// [api]
/// base_url = "https://weatherapi.pelmorex.com/api/v1/observation/placecode"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Place code of the last selected city.
    pub last_city: Option<String>,

    /// "metric" or "imperial".
    pub preferred_unit: Option<String>,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub contact: ContactConfig,
}

impl Config {
    /// Saved city, or the first catalog city when unset or unrecognised.
    pub fn last_city(&self) -> City {
        self.last_city
            .as_deref()
            .and_then(|s| City::try_from(s).ok())
            .unwrap_or_default()
    }

    pub fn set_last_city(&mut self, city: City) {
        self.last_city = Some(city.provider_code().to_string());
    }

    /// Saved unit, or metric when unset or unrecognised.
    pub fn preferred_unit(&self) -> TemperatureUnit {
        self.preferred_unit
            .as_deref()
            .and_then(|s| TemperatureUnit::try_from(s).ok())
            .unwrap_or_default()
    }

    pub fn set_preferred_unit(&mut self, unit: TemperatureUnit) {
        self.preferred_unit = Some(unit.as_str().to_string());
    }

    /// Load config from the platform config directory, or defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or return defaults if the file doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skylens", "skylens")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
