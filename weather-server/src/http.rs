use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use weather_core::{QueryError, QueryOutcome, StructuredResponse, WeatherAssistant, WeatherReading};

use crate::error::ApiError;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub assistant: Arc<WeatherAssistant>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Report {
        success: bool,
        data: StructuredResponse,
        raw_weather: WeatherReading,
    },
    Message {
        success: bool,
        message: String,
    },
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Report { data, raw_weather } => {
                QueryResponse::Report { success: true, data, raw_weather }
            }
            QueryOutcome::Message(message) => QueryResponse::Message { success: true, message },
        }
    }
}

/// Create the application router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/weather-query", post(weather_query))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn weather_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = match payload {
        Ok(Json(req)) => req.query.unwrap_or_default(),
        Err(rejection) => {
            return Err(QueryError::Validation(rejection.body_text()).into());
        }
    };

    let outcome = state.assistant.handle(&query).await?;
    Ok(Json(outcome.into()))
}
