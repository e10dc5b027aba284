use crate::transport::TransportError;

/// Ways a weather fetch can fail.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Invalid weather URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    #[error("Weather API responded with status {0}")]
    InvalidResponse(u16),

    #[error("Failed to decode weather JSON: {0}")]
    Decoding(#[from] serde_json::Error),
}

impl WeatherError {
    /// Short message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network(_) => {
                "Unable to load weather data. Please check your connection and try again."
            }
            WeatherError::Decoding(_) | WeatherError::InvalidResponse(_) => {
                "There was a problem processing the weather data. Please try again later."
            }
            WeatherError::InvalidUrl(_) => "Invalid weather data source. Please contact support.",
        }
    }
}
