use thiserror::Error;

/// Failures of the weather provider call.
#[derive(Debug, Error)]
pub enum WeatherFetchError {
    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Failed to reach weather provider: {0}")]
    Request(String),

    /// Non-success status; carries the provider's `reason`.
    #[error("{reason}")]
    Provider { status: u16, reason: String },

    #[error("Failed to parse weather provider response: {0}")]
    Parse(String),
}

/// Everything that can end a query, one variant per failure kind.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Language service error: {0}")]
    Upstream(String),

    #[error(transparent)]
    WeatherFetch(#[from] WeatherFetchError),

    #[error("Structured response rejected: {0}")]
    Schema(String),
}

impl QueryError {
    /// Short machine-friendly name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Validation(_) => "validation",
            QueryError::Configuration(_) => "configuration",
            QueryError::Upstream(_) => "upstream",
            QueryError::WeatherFetch(_) => "weather_fetch",
            QueryError::Schema(_) => "schema",
        }
    }
}
