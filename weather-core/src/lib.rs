//! Core library for the `weather-query` service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Shared domain models (tool invocations, readings, structured responses)
//! - Unit and weather-code normalization
//! - Abstractions over the weather provider and the language model
//! - The query orchestrator tying them together
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod language;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod provider;
pub mod schema;

pub use config::Config;
pub use error::{QueryError, WeatherFetchError};
pub use language::{Interpretation, LanguageModel};
pub use model::{
    PressureUnit, QueryOutcome, StructuredResponse, TemperatureUnit, ToolInvocation,
    VisibilityUnit, WeatherReading, WindUnit,
};
pub use orchestrator::WeatherAssistant;
pub use provider::WeatherProvider;
