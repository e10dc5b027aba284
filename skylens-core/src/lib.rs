//! Core library for the SkyLens client.
//!
//! This crate defines:
//! - The city catalog and weather domain models
//! - Contact form validation
//! - An HTTP weather client behind an injectable transport
//! - Configuration & persisted preferences
//! - Presenters holding the weather and contact screen state
//!
//! It is used by `skylens-cli`, but any other front end can drive the presenters.

pub mod config;
pub mod contact;
pub mod error;
pub mod model;
pub mod preferences;
pub mod presenter;
pub mod provider;
pub mod transport;

pub use config::{ApiConfig, Config, ContactConfig};
pub use contact::{Contact, ContactField, ValidationError, validate};
pub use error::WeatherError;
pub use model::{City, TemperatureUnit, WeatherInfo};
pub use preferences::{FilePreferences, InMemoryPreferences, PreferencesStore};
pub use presenter::{
    ContactPresenter, ContactSubmitter, SimulatedSubmitter, SubmissionStatus, ViewState,
    WeatherPresenter,
};
pub use provider::{WeatherService, provider_from_config};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
