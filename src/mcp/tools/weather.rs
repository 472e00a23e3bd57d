use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::connectors::weather_service::{AlertFeature, ForecastPeriod, WeatherConnector};
use crate::mcp::errors::ToolError;
use crate::mcp::protocol::ToolContent;
use crate::mcp::registry::ToolHandler;
use crate::mcp::schema::{ParamField, ParamKind, ParamSchema, ValidatedParams};

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("Unknown")
}

fn format_alert(alert: &AlertFeature) -> String {
    let props = &alert.properties;
    format!(
        "Event: {}\nArea: {}\nSeverity: {}\nStatus: {}\nHeadline: {}\n---",
        or_unknown(&props.event),
        or_unknown(&props.area_desc),
        or_unknown(&props.severity),
        or_unknown(&props.status),
        props.headline.as_deref().unwrap_or("No headline"),
    )
}

fn format_period(period: &ForecastPeriod) -> String {
    let temperature = period
        .temperature
        .map(|t| t.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    format!(
        "{}:\nTemperature: {}°{}\nWind: {} {}\n{}\n---",
        or_unknown(&period.name),
        temperature,
        period.temperature_unit.as_deref().unwrap_or("F"),
        or_unknown(&period.wind_speed),
        period.wind_direction.as_deref().unwrap_or(""),
        period
            .short_forecast
            .as_deref()
            .unwrap_or("No forecast available"),
    )
}

/// Active weather alerts for a US state
pub struct GetAlertsTool {
    weather: Arc<dyn WeatherConnector>,
}

impl GetAlertsTool {
    pub const NAME: &'static str = "get-alerts";
    pub const DESCRIPTION: &'static str = "Get weather alerts for a US state";

    pub fn new(weather: Arc<dyn WeatherConnector>) -> Self {
        Self { weather }
    }

    pub fn schema() -> ParamSchema {
        ParamSchema::new().field(ParamField::new(
            "state",
            "Two-letter US state code (e.g. CA, NY)",
            ParamKind::string_length(2, 2),
        ))
    }
}

#[async_trait]
impl ToolHandler for GetAlertsTool {
    async fn execute(&self, params: ValidatedParams) -> Result<ToolContent, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            state: String,
        }

        let args: Args = params
            .parse()
            .map_err(|e| ToolError::new(format!("Invalid arguments: {}", e)))?;
        let state = args.state.to_uppercase();

        let text = match self.weather.active_alerts(&state).await {
            None => "Failed to retrieve alerts data".to_string(),
            Some(alerts) if alerts.features.is_empty() => {
                format!("No active alerts for {}", state)
            }
            Some(alerts) => {
                let blocks: Vec<String> = alerts.features.iter().map(format_alert).collect();
                format!("Active alerts for {}:\n\n{}", state, blocks.join("\n"))
            }
        };

        Ok(ToolContent::text(text))
    }
}

/// Multi-period forecast for a coordinate, resolved through the NWS grid
pub struct GetForecastTool {
    weather: Arc<dyn WeatherConnector>,
}

impl GetForecastTool {
    pub const NAME: &'static str = "get-forecast";
    pub const DESCRIPTION: &'static str = "Get weather forecast for a location";

    pub fn new(weather: Arc<dyn WeatherConnector>) -> Self {
        Self { weather }
    }

    pub fn schema() -> ParamSchema {
        ParamSchema::new()
            .field(ParamField::new(
                "latitude",
                "Latitude of the location",
                ParamKind::number_range(-90.0, 90.0),
            ))
            .field(ParamField::new(
                "longitude",
                "Longitude of the location",
                ParamKind::number_range(-180.0, 180.0),
            ))
    }
}

#[async_trait]
impl ToolHandler for GetForecastTool {
    async fn execute(&self, params: ValidatedParams) -> Result<ToolContent, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            latitude: f64,
            longitude: f64,
        }

        let args: Args = params
            .parse()
            .map_err(|e| ToolError::new(format!("Invalid arguments: {}", e)))?;
        let (lat, lon) = (args.latitude, args.longitude);

        let point = match self.weather.grid_point(lat, lon).await {
            Some(point) => point,
            None => {
                return Ok(ToolContent::text(format!(
                    "Failed to retrieve grid point data for coordinates: {}, {}. \
                     This location may not be supported by the NWS API (only US locations are supported).",
                    lat, lon
                )))
            }
        };

        let forecast_url = match point.properties.forecast {
            Some(url) => url,
            None => {
                return Ok(ToolContent::text(
                    "Failed to get forecast URL from grid point data",
                ))
            }
        };

        let text = match self.weather.forecast(&forecast_url).await {
            None => "Failed to retrieve forecast data".to_string(),
            Some(forecast) if forecast.properties.periods.is_empty() => {
                "No forecast periods available".to_string()
            }
            Some(forecast) => {
                let blocks: Vec<String> = forecast
                    .properties
                    .periods
                    .iter()
                    .map(format_period)
                    .collect();
                format!("Forecast for {}, {}:\n\n{}", lat, lon, blocks.join("\n"))
            }
        };

        Ok(ToolContent::text(text))
    }
}
