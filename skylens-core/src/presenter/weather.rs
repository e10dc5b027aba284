use chrono::Local;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

use crate::{
    error::WeatherError,
    model::{City, TemperatureUnit, WeatherInfo},
    preferences::PreferencesStore,
    provider::WeatherService,
};

pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

const PLACEHOLDER: &str = "--";

/// What the weather screen should currently show.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Loaded,
    Error(String),
}

#[derive(Debug)]
struct Selection {
    city: City,
    unit: TemperatureUnit,
    info: Option<WeatherInfo>,
    /// Ticket of the most recently started fetch.
    latest: u64,
}

/// Holds the selected city/unit, drives fetches and exposes display strings.
///
/// Each fetch takes a ticket; a completion whose ticket is no longer the
/// latest is discarded, so the last started request decides what is shown.
#[derive(Debug)]
pub struct WeatherPresenter {
    service: Arc<dyn WeatherService>,
    prefs: Arc<dyn PreferencesStore>,
    inner: Mutex<Selection>,
    state: watch::Sender<ViewState>,
}

impl WeatherPresenter {
    pub fn new(service: Arc<dyn WeatherService>, prefs: Arc<dyn PreferencesStore>) -> Self {
        let selection = Selection {
            city: prefs.last_city(),
            unit: prefs.preferred_unit(),
            info: None,
            latest: 0,
        };
        let (state, _) = watch::channel(ViewState::Loading);

        Self { service, prefs, inner: Mutex::new(selection), state }
    }

    /// Load weather for the current selection. Used for the initial load and
    /// for manual refresh; never de-duplicated.
    pub async fn fetch_weather(&self) {
        let (ticket, city, unit) = {
            let mut inner = self.inner.lock();
            inner.latest += 1;
            self.state.send_replace(ViewState::Loading);
            (inner.latest, inner.city, inner.unit)
        };

        let result = self.service.fetch_weather(city, unit).await;

        let mut inner = self.inner.lock();
        if inner.latest != ticket {
            tracing::debug!(%city, %unit, ticket, latest = inner.latest, "dropping stale weather response");
            return;
        }

        match result {
            Ok(info) => {
                inner.info = Some(info);
                self.state.send_replace(ViewState::Loaded);
            }
            Err(err) => {
                tracing::warn!(%city, %unit, "weather fetch failed: {err:#}");
                self.state.send_replace(ViewState::Error(user_message(&err).to_string()));
            }
        }
    }

    /// Switch to `city`, remember it, and fetch. Re-selecting the current
    /// city does nothing.
    pub async fn select_city(&self, city: City) {
        {
            let mut inner = self.inner.lock();
            if inner.city == city {
                return;
            }
            inner.city = city;
        }

        self.prefs.save_last_city(city);
        self.fetch_weather().await;
    }

    /// Flip metric/imperial, remember it, and fetch.
    pub async fn toggle_unit(&self) {
        let unit = {
            let mut inner = self.inner.lock();
            inner.unit = inner.unit.toggled();
            inner.unit
        };

        self.prefs.save_preferred_unit(unit);
        self.fetch_weather().await;
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn selected_city(&self) -> City {
        self.inner.lock().city
    }

    pub fn preferred_unit(&self) -> TemperatureUnit {
        self.inner.lock().unit
    }

    /// Last successfully fetched info. Kept after a failed fetch.
    pub fn weather_info(&self) -> Option<WeatherInfo> {
        self.inner.lock().info.clone()
    }

    pub fn city_name(&self) -> String {
        let inner = self.inner.lock();
        match &inner.info {
            Some(info) => info.city_name.clone(),
            None => inner.city.display_name().to_string(),
        }
    }

    pub fn condition(&self) -> String {
        self.inner.lock().info.as_ref().map(|i| i.condition.clone()).unwrap_or_default()
    }

    pub fn temperature(&self) -> String {
        self.format_with(|i| format!("{:.1}", i.temperature))
    }

    pub fn temperature_value(&self) -> f64 {
        self.inner.lock().info.as_ref().map_or(0.0, |i| i.temperature)
    }

    pub fn feels_like(&self) -> String {
        self.format_with(|i| format!("{:.1}", i.feels_like))
    }

    /// e.g. "Oct 18, 2023, 2:30 PM" in local time.
    pub fn last_updated(&self) -> String {
        self.format_with(|i| {
            i.last_updated.with_timezone(&Local).format("%b %-d, %Y, %-I:%M %p").to_string()
        })
    }

    pub fn unit_symbol(&self) -> &'static str {
        self.inner.lock().unit.symbol()
    }

    pub fn icon_url(&self) -> Option<String> {
        self.inner.lock().info.as_ref().map(WeatherInfo::icon_url)
    }

    fn format_with(&self, f: impl FnOnce(&WeatherInfo) -> String) -> String {
        self.inner.lock().info.as_ref().map(f).unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

fn user_message(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<WeatherError>()
        .map(WeatherError::user_message)
        .unwrap_or(UNEXPECTED_ERROR_MESSAGE)
}
