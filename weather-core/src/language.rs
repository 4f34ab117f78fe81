use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{Config, WeatherReading, error::QueryError, schema::ToolSpec};

pub mod openai;

pub use openai::OpenAiResponsesClient;

/// What the language model decided to do with a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// Plain text reply, no tool use.
    Answer(String),
    /// Request to run a tool; `arguments` is the raw JSON text.
    ToolCall { name: String, arguments: String },
}

/// Language-understanding service used by the orchestrator.
#[async_trait]
pub trait LanguageModel: Send + Sync + Debug {
    /// Offer `tool` to the model and report whether it wants to call it.
    async fn interpret(&self, query: &str, tool: &ToolSpec) -> Result<Interpretation, QueryError>;

    /// Ask the model to restructure `reading` into JSON matching `schema`.
    /// Returns the raw reply text; validation is up to the caller.
    async fn structure(
        &self,
        query: &str,
        reading: &WeatherReading,
        schema: &Value,
    ) -> Result<String, QueryError>;
}

/// Construct the configured language model client.
pub fn language_model_from_config(config: &Config) -> anyhow::Result<Box<dyn LanguageModel>> {
    let client = OpenAiResponsesClient::new(config.language_model.clone())?;
    Ok(Box::new(client))
}
