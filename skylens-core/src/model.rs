use chrono::{DateTime, Utc};
use std::fmt;

/// Cities the client knows how to show, keyed by their upstream place code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum City {
    #[default]
    Toronto,
    Montreal,
    Ottawa,
    Vancouver,
    Calgary,
}

impl City {
    /// Opaque place code understood by the weather API.
    pub fn provider_code(&self) -> &'static str {
        match self {
            City::Toronto => "CAON0696",
            City::Montreal => "CAON0423",
            City::Ottawa => "CAON0512",
            City::Vancouver => "CABC0308",
            City::Calgary => "CAAB0049",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            City::Toronto => "Toronto",
            City::Montreal => "Montreal",
            City::Ottawa => "Ottawa",
            City::Vancouver => "Vancouver",
            City::Calgary => "Calgary",
        }
    }

    pub const fn all() -> &'static [City] {
        &[City::Toronto, City::Montreal, City::Ottawa, City::Vancouver, City::Calgary]
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl TryFrom<&str> for City {
    type Error = anyhow::Error;

    /// Accepts either the place code ("CAON0696") or the display name ("toronto").
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let needle = value.trim();

        City::all()
            .iter()
            .copied()
            .find(|city| {
                city.provider_code().eq_ignore_ascii_case(needle)
                    || city.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| {
                let supported =
                    City::all().iter().map(City::display_name).collect::<Vec<_>>().join(", ");
                anyhow::anyhow!("Unknown city '{value}'. Supported cities: {supported}.")
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemperatureUnit {
    #[default]
    Metric,
    Imperial,
}

impl TemperatureUnit {
    /// Value sent as the `unit` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Metric => "metric",
            TemperatureUnit::Imperial => "imperial",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Metric => "°C",
            TemperatureUnit::Imperial => "°F",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Metric => TemperatureUnit::Imperial,
            TemperatureUnit::Imperial => TemperatureUnit::Metric,
        }
    }

    pub const fn all() -> &'static [TemperatureUnit] {
        &[TemperatureUnit::Metric, TemperatureUnit::Imperial]
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(TemperatureUnit::Metric),
            "imperial" => Ok(TemperatureUnit::Imperial),
            _ => Err(anyhow::anyhow!("Unknown unit '{value}'. Supported units: metric, imperial.")),
        }
    }
}

/// Current conditions for one city, as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherInfo {
    pub city_name: String,
    pub condition: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub last_updated: DateTime<Utc>,
    pub weather_code: i32,
    pub unit: TemperatureUnit,
    pub image_base_url: String,
}

impl WeatherInfo {
    /// Icon location, formed as `<image base><code>.png`.
    pub fn icon_url(&self) -> String {
        format!("{}{}.png", self.image_base_url, self.weather_code)
    }
}
