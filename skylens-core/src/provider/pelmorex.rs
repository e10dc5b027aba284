use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    config::DEFAULT_BASE_URL,
    error::WeatherError,
    model::{City, TemperatureUnit, WeatherInfo},
    transport::HttpTransport,
};

use super::WeatherService;

/// Client for the place-code observation endpoint.
///
/// Stateless between calls: the requested city is carried through to the
/// mapping step, so overlapping fetches can't mislabel each other.
#[derive(Debug, Clone)]
pub struct PelmorexClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl PelmorexClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_base_url(transport, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), transport }
    }

    /// `<base>/<place code>?unit=<metric|imperial>`
    pub fn weather_url(&self, city: City, unit: TemperatureUnit) -> Result<Url, WeatherError> {
        let base = self.base_url.trim_end_matches('/');
        let url = Url::parse(&format!("{base}/{}?unit={}", city.provider_code(), unit.as_str()))?;
        Ok(url)
    }

    pub async fn fetch(&self, city: City, unit: TemperatureUnit) -> Result<WeatherInfo, WeatherError> {
        let url = self.weather_url(city, unit)?;
        tracing::debug!(%url, city = %city, "fetching observation");

        let res = self.transport.get(&url).await?;

        if !res.is_success() {
            tracing::warn!(status = res.status, body = %truncate_body(&res.body), "weather request rejected");
            return Err(WeatherError::InvalidResponse(res.status));
        }

        let parsed: PwResponse = serde_json::from_str(&res.body)?;

        Ok(map_observation(parsed, city, unit))
    }
}

#[async_trait]
impl WeatherService for PelmorexClient {
    async fn fetch_weather(&self, city: City, unit: TemperatureUnit) -> anyhow::Result<WeatherInfo> {
        Ok(self.fetch(city, unit).await?)
    }
}

fn map_observation(parsed: PwResponse, city: City, unit: TemperatureUnit) -> WeatherInfo {
    let observation = parsed.observation;

    let last_updated = parse_utc(&observation.time.utc).unwrap_or_else(|| {
        tracing::debug!(raw = %observation.time.utc, "unparseable observation time, using now");
        Utc::now()
    });

    WeatherInfo {
        city_name: city.display_name().to_string(),
        condition: observation.weather_code.text,
        temperature: observation.temperature,
        feels_like: observation.feels_like,
        last_updated,
        weather_code: observation.weather_code.icon,
        unit,
        image_base_url: parsed.display.image_url,
    }
}

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[derive(Debug, Deserialize)]
struct PwTime {
    #[allow(dead_code)]
    local: String,
    utc: String,
}

#[derive(Debug, Deserialize)]
struct PwWeatherCode {
    #[allow(dead_code)]
    value: String,
    icon: i32,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PwObservation {
    time: PwTime,
    weather_code: PwWeatherCode,
    temperature: f64,
    feels_like: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PwDisplay {
    image_url: String,
    #[allow(dead_code)]
    unit: PwUnits,
}

#[derive(Debug, Deserialize)]
struct PwUnits {
    #[allow(dead_code)]
    temperature: String,
}

#[derive(Debug, Deserialize)]
struct PwResponse {
    observation: PwObservation,
    display: PwDisplay,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, ReqwestTransport, TransportError, DEFAULT_TIMEOUT};
    use parking_lot::Mutex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_JSON: &str = r#"{
        "observation": {
            "time": { "local": "2023-10-18T10:30:00", "utc": "2023-10-18T14:30:00Z" },
            "weatherCode": {
                "value": "-BKNN",
                "icon": 32,
                "text": "Partly Cloudy",
                "bgimage": "clearnight",
                "overlay": "clear-night"
            },
            "temperature": 22.5,
            "feelsLike": 23.0,
            "dewPoint": 12.0,
            "wind": { "direction": "E", "speed": 17, "gust": 26 },
            "relativeHumidity": 68,
            "pressure": { "value": 100.7, "trendKey": 1 },
            "visibility": 24,
            "ceiling": 7900
        },
        "display": {
            "imageUrl": "https://icons.example.com/",
            "unit": { "temperature": "C", "wind": "km/h" }
        }
    }"#;

    /// Canned transport that records the URLs it was asked for.
    #[derive(Debug)]
    struct MockTransport {
        reply: Mutex<Option<Result<HttpResponse, TransportError>>>,
        urls: Mutex<Vec<Url>>,
    }

    impl MockTransport {
        fn replying(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(Ok(HttpResponse { status, body: body.to_string() }))),
                urls: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: TransportError) -> Arc<Self> {
            Arc::new(Self { reply: Mutex::new(Some(Err(err))), urls: Mutex::new(Vec::new()) })
        }

        fn last_url(&self) -> Option<Url> {
            self.urls.lock().last().cloned()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
            self.urls.lock().push(url.clone());
            self.reply.lock().take().unwrap_or_else(|| Err(std::io::Error::other("no mock reply").into()))
        }
    }

    #[tokio::test]
    async fn maps_valid_observation() {
        let transport = MockTransport::replying(200, VALID_JSON);
        let client = PelmorexClient::new(transport.clone());

        let info = client.fetch(City::Toronto, TemperatureUnit::Metric).await.unwrap();

        assert_eq!(info.city_name, "Toronto");
        assert_eq!(info.condition, "Partly Cloudy");
        assert!((info.temperature - 22.5).abs() < 1e-3);
        assert!((info.feels_like - 23.0).abs() < 1e-3);
        assert_eq!(info.weather_code, 32);
        assert_eq!(info.unit, TemperatureUnit::Metric);
        assert_eq!(info.image_base_url, "https://icons.example.com/");
        assert_eq!(info.last_updated.to_rfc3339(), "2023-10-18T14:30:00+00:00");

        let url = transport.last_url().unwrap().to_string();
        assert!(url.contains("CAON0696"));
        assert!(url.contains("unit=metric"));
    }

    #[tokio::test]
    async fn city_name_comes_from_the_request() {
        let transport = MockTransport::replying(200, VALID_JSON);
        let client = PelmorexClient::new(transport.clone());

        let info = client.fetch(City::Calgary, TemperatureUnit::Imperial).await.unwrap();

        assert_eq!(info.city_name, "Calgary");
        assert_eq!(info.unit, TemperatureUnit::Imperial);
        let url = transport.last_url().unwrap().to_string();
        assert!(url.contains("CAAB0049"));
        assert!(url.contains("unit=imperial"));
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotConnected, "offline");
        let client = PelmorexClient::new(MockTransport::failing(io.into()));

        let err = client.fetch(City::Toronto, TemperatureUnit::Metric).await.unwrap_err();

        assert!(matches!(err, WeatherError::Network(_)), "{err:?}");
    }

    #[tokio::test]
    async fn non_success_status_is_invalid_response_even_with_valid_body() {
        let client = PelmorexClient::new(MockTransport::replying(404, VALID_JSON));

        let err = client.fetch(City::Toronto, TemperatureUnit::Metric).await.unwrap_err();

        assert!(matches!(err, WeatherError::InvalidResponse(404)), "{err:?}");
    }

    #[tokio::test]
    async fn malformed_body_is_decoding_error() {
        let client = PelmorexClient::new(MockTransport::replying(200, r#"{"observation": {}}"#));

        let err = client.fetch(City::Toronto, TemperatureUnit::Metric).await.unwrap_err();

        assert!(matches!(err, WeatherError::Decoding(_)), "{err:?}");
    }

    #[tokio::test]
    async fn missing_display_units_is_decoding_error() {
        let body = VALID_JSON.replace(
            r#""unit": { "temperature": "C", "wind": "km/h" }"#,
            r#""theme": "light""#,
        );
        assert_ne!(body, VALID_JSON);
        let client = PelmorexClient::new(MockTransport::replying(200, &body));

        let err = client.fetch(City::Toronto, TemperatureUnit::Metric).await.unwrap_err();

        assert!(matches!(err, WeatherError::Decoding(_)), "{err:?}");
    }

    #[tokio::test]
    async fn missing_weather_code_value_is_decoding_error() {
        let body = VALID_JSON.replace(r#""value": "-BKNN","#, "");
        assert_ne!(body, VALID_JSON);
        let client = PelmorexClient::new(MockTransport::replying(200, &body));

        let err = client.fetch(City::Toronto, TemperatureUnit::Metric).await.unwrap_err();

        assert!(matches!(err, WeatherError::Decoding(_)), "{err:?}");
    }

    #[tokio::test]
    async fn unparseable_timestamp_falls_back_to_now() {
        let body = VALID_JSON.replace("2023-10-18T14:30:00Z", "yesterday-ish");
        let client = PelmorexClient::new(MockTransport::replying(200, &body));

        let before = Utc::now();
        let info = client.fetch(City::Toronto, TemperatureUnit::Metric).await.unwrap();

        assert!(info.last_updated >= before);
    }

    #[test]
    fn bad_base_is_invalid_url() {
        let client =
            PelmorexClient::with_base_url(MockTransport::replying(200, VALID_JSON), "not a url");

        let err = client.weather_url(City::Toronto, TemperatureUnit::Metric).unwrap_err();

        assert!(matches!(err, WeatherError::InvalidUrl(_)));
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let client = PelmorexClient::with_base_url(
            MockTransport::replying(200, VALID_JSON),
            "https://api.example.com/obs/",
        );

        let url = client.weather_url(City::Ottawa, TemperatureUnit::Imperial).unwrap();

        assert_eq!(url.as_str(), "https://api.example.com/obs/CAON0512?unit=imperial");
    }

    #[tokio::test]
    async fn fetches_over_http() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/observation/placecode/CABC0308"))
            .and(query_param("unit", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_JSON))
            .expect(1)
            .mount(&server)
            .await;

        let transport = Arc::new(ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap());
        let client = PelmorexClient::with_base_url(
            transport,
            format!("{}/observation/placecode", server.uri()),
        );

        let info = client.fetch(City::Vancouver, TemperatureUnit::Metric).await.unwrap();

        assert_eq!(info.city_name, "Vancouver");
        assert_eq!(info.weather_code, 32);
    }

    #[tokio::test]
    async fn server_error_over_http_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string(VALID_JSON))
            .mount(&server)
            .await;

        let transport = Arc::new(ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap());
        let client = PelmorexClient::with_base_url(transport, server.uri());

        let err = client.fetch(City::Toronto, TemperatureUnit::Metric).await.unwrap_err();

        assert!(matches!(err, WeatherError::InvalidResponse(500)));
    }

    #[tokio::test]
    async fn service_trait_keeps_the_typed_error() {
        let client = PelmorexClient::new(MockTransport::replying(503, ""));

        let err = client.fetch_weather(City::Toronto, TemperatureUnit::Metric).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<WeatherError>(), Some(WeatherError::InvalidResponse(503))));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}
