//! Mapping of query failures onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use weather_core::QueryError;

pub const QUERY_REQUIRED: &str = "Query is required";
pub const FETCH_FAILED: &str = "Failed to fetch weather data";
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError(pub QueryError);

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match &self.0 {
            QueryError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                ErrorBody { error: QUERY_REQUIRED.to_string(), details: None },
            ),
            QueryError::WeatherFetch(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody { error: FETCH_FAILED.to_string(), details: Some(e.to_string()) },
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody { error: INTERNAL_ERROR.to_string(), details: Some(other.to_string()) },
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            QueryError::Validation(msg) => tracing::warn!(reason = %msg, "Rejected query"),
            err => tracing::error!(kind = err.kind(), error = %err, "Query failed"),
        }

        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}
