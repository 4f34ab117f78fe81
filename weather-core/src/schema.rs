//! Tool declaration, strict response schema and prompts sent to the language model.

use serde_json::{Value, json};

use crate::{error::QueryError, model::StructuredResponse};

pub const WEATHER_TOOL_NAME: &str = "get_weather";

pub const WEATHER_TOOL_DESCRIPTION: &str =
    "Get current weather data for a location given its coordinates.";

pub const STRUCTURED_RESPONSE_NAME: &str = "weather_response";

pub const INTERPRET_SYSTEM_PROMPT: &str = "You are a weather assistant. Whenever a location \
can be inferred from the user's message, call the get_weather tool. If the user does not give \
coordinates, use approximate coordinates for well-known cities. Pick units that match the \
user's wording or region when they are implied; otherwise leave them out.";

pub const STRUCTURE_SYSTEM_PROMPT: &str = "You format weather data. Using the raw weather \
reading and the user's original question, produce weather_data (copied from the reading), a \
short summary, an ordered list of practical recommendations, and any additional_info worth \
mentioning.";

/// Reply used when the model answers directly with empty text.
pub const FALLBACK_MESSAGE: &str = "I can help you with weather information. Please ask about \
the weather in a specific location, for example \"What's the weather in Paris?\"";

/// A callable function offered to the language model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

pub fn weather_tool() -> ToolSpec {
    ToolSpec {
        name: WEATHER_TOOL_NAME,
        description: WEATHER_TOOL_DESCRIPTION,
        parameters: json!({
            "type": "object",
            "properties": {
                "latitude": { "type": "number", "description": "Latitude of the location" },
                "longitude": { "type": "number", "description": "Longitude of the location" },
                "location_name": {
                    "type": "string",
                    "description": "Display name of the location, e.g. \"Paris, France\""
                },
                "temperature_unit": { "type": "string", "enum": ["celsius", "fahrenheit"] },
                "wind_unit": { "type": "string", "enum": ["kmh", "mph"] },
                "pressure_unit": { "type": "string", "enum": ["hPa", "mb"] },
                "visibility_unit": { "type": "string", "enum": ["km", "miles"] }
            },
            "required": ["latitude", "longitude", "location_name"],
            "additionalProperties": false
        }),
    }
}

fn weather_reading_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "location": { "type": "string" },
            "temperature": { "type": "number" },
            "temperature_unit": { "type": "string", "enum": ["celsius", "fahrenheit"] },
            "condition": { "type": "string" },
            "humidity": { "type": "number" },
            "wind_speed": { "type": "number" },
            "wind_unit": { "type": "string", "enum": ["kmh", "mph"] },
            "wind_direction": { "type": "number" },
            "pressure": { "type": "number" },
            "pressure_unit": { "type": "string", "enum": ["hPa", "mb"] },
            "visibility": { "type": "number" },
            "visibility_unit": { "type": "string", "enum": ["km", "miles"] },
            "precipitation": { "type": "number" },
            "cloud_cover": { "type": "number" },
            "uv_index": { "type": "number" },
            "feels_like": { "type": "number" },
            "description": { "type": "string" },
            "timestamp": { "type": "string", "format": "date-time" }
        },
        "required": [
            "location", "temperature", "temperature_unit", "condition", "humidity",
            "wind_speed", "wind_unit", "wind_direction", "pressure", "pressure_unit",
            "visibility", "visibility_unit", "precipitation", "cloud_cover", "uv_index",
            "feels_like", "description", "timestamp"
        ],
        "additionalProperties": false
    })
}

/// JSON schema for [`StructuredResponse`], in strict form.
pub fn structured_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "weather_data": weather_reading_schema(),
            "summary": { "type": "string" },
            "recommendations": { "type": "array", "items": { "type": "string" } },
            "additional_info": { "type": "string" }
        },
        "required": ["weather_data", "summary", "recommendations", "additional_info"],
        "additionalProperties": false
    })
}

/// Parse and check a structuring reply. Anything that does not match the
/// strict schema is rejected rather than passed through.
pub fn validate_structured_response(raw: &str) -> Result<StructuredResponse, QueryError> {
    let response: StructuredResponse =
        serde_json::from_str(raw).map_err(|e| QueryError::Schema(e.to_string()))?;

    if response.summary.trim().is_empty() {
        return Err(QueryError::Schema("summary must not be empty".to_string()));
    }
    if response.weather_data.location.trim().is_empty() {
        return Err(QueryError::Schema("weather_data.location must not be empty".to_string()));
    }
    if !(0.0..360.0).contains(&response.weather_data.wind_direction) {
        return Err(QueryError::Schema(format!(
            "weather_data.wind_direction {} is outside [0, 360)",
            response.weather_data.wind_direction
        )));
    }

    Ok(response)
}
