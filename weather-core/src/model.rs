use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }

    /// Single-letter suffix used after the degree sign.
    pub fn symbol(&self) -> char {
        match self {
            TemperatureUnit::Celsius => 'C',
            TemperatureUnit::Fahrenheit => 'F',
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindUnit {
    #[default]
    Kmh,
    Mph,
}

impl WindUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindUnit::Kmh => "kmh",
            WindUnit::Mph => "mph",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureUnit {
    #[default]
    #[serde(rename = "hPa")]
    HPa,
    #[serde(rename = "mb")]
    Mb,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityUnit {
    #[default]
    Km,
    Miles,
}

/// Arguments of a `get_weather` tool call, as decided by the language model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolInvocation {
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
    #[serde(default)]
    pub temperature_unit: Option<TemperatureUnit>,
    #[serde(default)]
    pub wind_unit: Option<WindUnit>,
    #[serde(default)]
    pub pressure_unit: Option<PressureUnit>,
    #[serde(default)]
    pub visibility_unit: Option<VisibilityUnit>,
}

impl ToolInvocation {
    pub fn new(latitude: f64, longitude: f64, location_name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            location_name: location_name.into(),
            temperature_unit: None,
            wind_unit: None,
            pressure_unit: None,
            visibility_unit: None,
        }
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.temperature_unit.unwrap_or_default()
    }

    pub fn wind_unit(&self) -> WindUnit {
        self.wind_unit.unwrap_or_default()
    }

    pub fn pressure_unit(&self) -> PressureUnit {
        self.pressure_unit.unwrap_or_default()
    }

    pub fn visibility_unit(&self) -> VisibilityUnit {
        self.visibility_unit.unwrap_or_default()
    }
}

/// Normalized current-conditions snapshot. Every numeric value is already
/// expressed in the unit stored next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherReading {
    pub location: String,
    pub temperature: f64,
    pub temperature_unit: TemperatureUnit,
    pub condition: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_unit: WindUnit,
    pub wind_direction: f64,
    pub pressure: f64,
    pub pressure_unit: PressureUnit,
    pub visibility: f64,
    pub visibility_unit: VisibilityUnit,
    /// Millimetres over the preceding interval.
    pub precipitation: f64,
    /// Percent of sky covered.
    pub cloud_cover: f64,
    pub uv_index: f64,
    pub feels_like: f64,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Final payload produced by the structuring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuredResponse {
    pub weather_data: WeatherReading,
    pub summary: String,
    pub recommendations: Vec<String>,
    pub additional_info: String,
}

/// Result of handling one query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Report {
        data: StructuredResponse,
        raw_weather: WeatherReading,
    },
    /// The model answered directly without asking for weather data.
    Message(String),
}
