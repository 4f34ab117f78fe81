use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    config::WeatherConfig,
    error::WeatherFetchError,
    model::{TemperatureUnit, ToolInvocation, WeatherReading},
    normalize::{
        code_to_condition, convert_pressure, convert_pressure_corrected, convert_visibility,
        normalize_direction,
    },
};

use super::WeatherProvider;

/// Metrics requested from the `current` block, in request order.
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
precipitation,weather_code,cloud_cover,pressure_msl,surface_pressure,wind_speed_10m,\
wind_direction_10m,visibility";

const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    config: WeatherConfig,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherFetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeatherFetchError::Request(e.to_string()))?;

        Ok(Self { config, http })
    }

    fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), WeatherFetchError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherFetchError::InvalidCoordinates { latitude, longitude });
        }
        Ok(())
    }

    fn query_params(invocation: &ToolInvocation) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", invocation.latitude.to_string()),
            ("longitude", invocation.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("temperature_unit", invocation.temperature_unit().as_str().to_string()),
            ("wind_speed_unit", invocation.wind_unit().as_str().to_string()),
        ]
    }

    fn to_reading(
        &self,
        invocation: &ToolInvocation,
        parsed: OmResponse,
    ) -> Result<WeatherReading, WeatherFetchError> {
        let current = parsed.current;
        let temperature_unit = invocation.temperature_unit();
        let pressure_unit = invocation.pressure_unit();
        let visibility_unit = invocation.visibility_unit();

        let condition = code_to_condition(current.weather_code).to_string();

        let pressure_hpa = current
            .pressure_msl
            .or(current.surface_pressure)
            .ok_or_else(|| {
                WeatherFetchError::Parse("missing pressure_msl and surface_pressure".to_string())
            })?;
        let pressure = if self.config.corrected_mb_conversion {
            convert_pressure_corrected(pressure_hpa, pressure_unit)
        } else {
            convert_pressure(pressure_hpa, pressure_unit)
        };

        let visibility_unit_name = parsed
            .current_units
            .as_ref()
            .and_then(|u| u.visibility.as_deref());
        let visibility_km = visibility_to_km(current.visibility, visibility_unit_name);

        let description = describe(
            &invocation.location_name,
            &condition,
            current.temperature_2m,
            temperature_unit,
        );

        Ok(WeatherReading {
            location: invocation.location_name.clone(),
            temperature: current.temperature_2m,
            temperature_unit,
            condition,
            humidity: current.relative_humidity_2m,
            wind_speed: current.wind_speed_10m,
            wind_unit: invocation.wind_unit(),
            wind_direction: normalize_direction(current.wind_direction_10m),
            pressure,
            pressure_unit,
            visibility: convert_visibility(visibility_km, visibility_unit),
            visibility_unit,
            precipitation: current.precipitation,
            cloud_cover: current.cloud_cover,
            uv_index: 0.0,
            feels_like: current.apparent_temperature,
            description,
            timestamp: Utc::now(),
        })
    }
}

/// Human-readable one-liner stored in `WeatherReading::description`.
pub fn describe(location: &str, condition: &str, temperature: f64, unit: TemperatureUnit) -> String {
    format!(
        "Current weather in {location}: {condition} with temperature of {temperature}°{}",
        unit.symbol()
    )
}

/// Open-Meteo reports visibility in metres (or feet) and says so in
/// `current_units`; without that hint the value is taken as kilometres.
fn visibility_to_km(value: f64, unit: Option<&str>) -> f64 {
    match unit {
        Some("m") => value / 1000.0,
        Some("ft") => value * 0.0003048,
        _ => value,
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentUnits {
    visibility: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    weather_code: i64,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    visibility: f64,
    pressure_msl: Option<f64>,
    surface_pressure: Option<f64>,
    precipitation: f64,
    cloud_cover: f64,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current_units: Option<OmCurrentUnits>,
    current: OmCurrent,
}

#[derive(Debug, Deserialize)]
struct OmErrorBody {
    reason: Option<String>,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    #[instrument(skip(self, invocation), fields(
        location = %invocation.location_name,
        lat = %invocation.latitude,
        lon = %invocation.longitude
    ))]
    async fn get_weather(
        &self,
        invocation: &ToolInvocation,
    ) -> Result<WeatherReading, WeatherFetchError> {
        Self::validate_coordinates(invocation.latitude, invocation.longitude)?;

        let url = format!("{}/forecast", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, "Fetching current weather");

        let res = self
            .http
            .get(&url)
            .query(&Self::query_params(invocation))
            .send()
            .await
            .map_err(|e| WeatherFetchError::Request(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherFetchError::Request(e.to_string()))?;

        if !status.is_success() {
            let reason = serde_json::from_str::<OmErrorBody>(&body)
                .ok()
                .and_then(|b| b.reason)
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());

            warn!(status = status.as_u16(), reason = %reason, "Weather provider rejected request");
            return Err(WeatherFetchError::Provider { status: status.as_u16(), reason });
        }

        let parsed: OmResponse =
            serde_json::from_str(&body).map_err(|e| WeatherFetchError::Parse(e.to_string()))?;

        self.to_reading(invocation, parsed)
    }
}
