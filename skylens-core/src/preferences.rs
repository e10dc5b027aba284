use anyhow::Result;
use parking_lot::Mutex;
use std::{fmt::Debug, path::PathBuf};

use crate::{
    config::Config,
    model::{City, TemperatureUnit},
};

/// The two remembered user choices. Lookups fall back to defaults and
/// writes never fail from the caller's point of view.
pub trait PreferencesStore: Send + Sync + Debug {
    fn last_city(&self) -> City;
    fn save_last_city(&self, city: City);
    fn preferred_unit(&self) -> TemperatureUnit;
    fn save_preferred_unit(&self, unit: TemperatureUnit);
}

#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    city: Mutex<Option<City>>,
    unit: Mutex<Option<TemperatureUnit>>,
}

impl InMemoryPreferences {
    pub fn new(city: City, unit: TemperatureUnit) -> Self {
        Self { city: Mutex::new(Some(city)), unit: Mutex::new(Some(unit)) }
    }
}

impl PreferencesStore for InMemoryPreferences {
    fn last_city(&self) -> City {
        self.city.lock().unwrap_or_default()
    }

    fn save_last_city(&self, city: City) {
        *self.city.lock() = Some(city);
    }

    fn preferred_unit(&self) -> TemperatureUnit {
        self.unit.lock().unwrap_or_default()
    }

    fn save_preferred_unit(&self, unit: TemperatureUnit) {
        *self.unit.lock() = Some(unit);
    }
}

/// Preferences persisted in the TOML config file.
///
/// Every save rewrites the whole file; a failed write is logged and the
/// in-memory value still changes.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    config: Mutex<Config>,
}

impl FilePreferences {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = Config::load_from(&path)?;
        Ok(Self { path, config: Mutex::new(config) })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Config::config_file_path()?)
    }

    /// Snapshot of the whole config, including non-preference sections.
    pub fn config(&self) -> Config {
        self.config.lock().clone()
    }

    fn update(&self, f: impl FnOnce(&mut Config)) {
        let mut config = self.config.lock();
        f(&mut config);

        if let Err(err) = config.save_to(&self.path) {
            tracing::warn!(path = %self.path.display(), "failed to persist preferences: {err:#}");
        }
    }
}

impl PreferencesStore for FilePreferences {
    fn last_city(&self) -> City {
        self.config.lock().last_city()
    }

    fn save_last_city(&self, city: City) {
        self.update(|cfg| cfg.set_last_city(city));
    }

    fn preferred_unit(&self) -> TemperatureUnit {
        self.config.lock().preferred_unit()
    }

    fn save_preferred_unit(&self, unit: TemperatureUnit) {
        self.update(|cfg| cfg.set_preferred_unit(unit));
    }
}
