//! National Weather Service (api.weather.gov) connector.
//!
//! Only US locations are covered by the upstream API.

use super::config::WeatherServiceConfig;
use super::errors::ConnectorError;
use super::http::{build_client, send_json};
use async_trait::async_trait;
use serde::Deserialize;

const GEO_JSON: &str = "application/geo+json";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AlertsResponse {
    #[serde(default)]
    pub features: Vec<AlertFeature>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AlertFeature {
    #[serde(default)]
    pub properties: AlertProperties,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AlertProperties {
    pub event: Option<String>,
    #[serde(rename = "areaDesc")]
    pub area_desc: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub headline: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PointsResponse {
    #[serde(default)]
    pub properties: PointsProperties,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PointsProperties {
    /// Absolute URL of the gridpoint forecast
    pub forecast: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ForecastResponse {
    #[serde(default)]
    pub properties: ForecastProperties,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ForecastProperties {
    #[serde(default)]
    pub periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ForecastPeriod {
    pub name: Option<String>,
    pub temperature: Option<f64>,
    #[serde(rename = "temperatureUnit")]
    pub temperature_unit: Option<String>,
    #[serde(rename = "windSpeed")]
    pub wind_speed: Option<String>,
    #[serde(rename = "windDirection")]
    pub wind_direction: Option<String>,
    #[serde(rename = "shortForecast")]
    pub short_forecast: Option<String>,
}

/// Weather collaborator. Each query resolves to `None` on any failure; the
/// failure is logged here and never reaches the caller. Calls are bounded by
/// the configured HTTP timeout.
#[async_trait]
pub trait WeatherConnector: Send + Sync {
    /// Active alerts for a two-letter state or area code.
    async fn active_alerts(&self, state: &str) -> Option<AlertsResponse>;
    /// Grid point metadata, including the forecast URL, for a coordinate.
    async fn grid_point(&self, latitude: f64, longitude: f64) -> Option<PointsResponse>;
    /// Forecast periods from a URL returned by [`WeatherConnector::grid_point`].
    async fn forecast(&self, forecast_url: &str) -> Option<ForecastResponse>;
}

/// HTTP-based NWS client
pub struct WeatherServiceClient {
    base_url: String,
    user_agent: String,
    http_client: reqwest::Client,
}

impl WeatherServiceClient {
    pub fn new(config: &WeatherServiceConfig) -> Result<Self, ConnectorError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            http_client: build_client(config.timeout_secs)?,
        })
    }

    async fn fetch<T>(&self, url: &str, query: &[(&str, &str)]) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let result: Result<T, ConnectorError> = send_json("nws", 1, || {
            self.http_client
                .get(url)
                .query(query)
                .header("User-Agent", &self.user_agent)
                .header("Accept", GEO_JSON)
        })
        .await;

        match result {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!(url = %url, "NWS request failed: {}", err);
                None
            }
        }
    }
}

#[async_trait]
impl WeatherConnector for WeatherServiceClient {
    async fn active_alerts(&self, state: &str) -> Option<AlertsResponse> {
        let url = format!("{}/alerts", self.base_url);
        self.fetch(&url, &[("area", state)]).await
    }

    async fn grid_point(&self, latitude: f64, longitude: f64) -> Option<PointsResponse> {
        let url = format!("{}/points/{:.4},{:.4}", self.base_url, latitude, longitude);
        self.fetch(&url, &[]).await
    }

    async fn forecast(&self, forecast_url: &str) -> Option<ForecastResponse> {
        self.fetch(forecast_url, &[]).await
    }
}
