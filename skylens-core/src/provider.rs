use crate::{
    City, Config, TemperatureUnit, WeatherInfo,
    provider::pelmorex::PelmorexClient,
    transport::ReqwestTransport,
};
use anyhow::Context;
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod pelmorex;

/// Source of current conditions, the seam the weather presenter depends on.
///
/// Implementations report [`crate::WeatherError`] through the `anyhow` error
/// so callers can downcast for the failure kind.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    async fn fetch_weather(&self, city: City, unit: TemperatureUnit) -> anyhow::Result<WeatherInfo>;
}

/// Construct the HTTP-backed weather service from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherService>> {
    let transport = ReqwestTransport::new(config.api.request_timeout())
        .context("Failed to build HTTP client for the weather API")?;

    let client = PelmorexClient::with_base_url(Arc::new(transport), config.api.base_url.clone());
    tracing::debug!(base_url = %config.api.base_url, "weather provider ready");

    Ok(Arc::new(client))
}
