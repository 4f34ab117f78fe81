use crate::{Config, ToolInvocation, WeatherReading, error::WeatherFetchError};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openmeteo;

pub use openmeteo::OpenMeteoProvider;

/// Source of current conditions for a set of coordinates.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(
        &self,
        invocation: &ToolInvocation,
    ) -> Result<WeatherReading, WeatherFetchError>;
}

/// Construct the configured provider.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = OpenMeteoProvider::new(config.weather.clone())?;
    Ok(Box::new(provider))
}
