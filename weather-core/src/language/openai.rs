//! Client for the OpenAI Responses API.
//!
//! Tool calls are read from top-level `function_call` output items. Text
//! lives in `output_text` parts of `message` items.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    config::{API_KEY_ENV, LanguageModelConfig},
    error::QueryError,
    model::WeatherReading,
    schema::{
        INTERPRET_SYSTEM_PROMPT, STRUCTURE_SYSTEM_PROMPT, STRUCTURED_RESPONSE_NAME, ToolSpec,
    },
};

use super::{Interpretation, LanguageModel};

#[derive(Debug, Clone)]
pub struct OpenAiResponsesClient {
    config: LanguageModelConfig,
    http: Client,
}

impl OpenAiResponsesClient {
    pub fn new(config: LanguageModelConfig) -> Result<Self, QueryError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QueryError::Upstream(e.to_string()))?;

        Ok(Self { config, http })
    }

    fn api_key(&self) -> Result<&str, QueryError> {
        self.config.api_key().ok_or_else(|| {
            QueryError::Configuration(format!(
                "No API key configured for the language service.\n\
                 Hint: set {API_KEY_ENV} or run `weather-query configure`."
            ))
        })
    }

    fn interpret_body(&self, query: &str, tool: &ToolSpec) -> Value {
        json!({
            "model": self.config.model,
            "instructions": INTERPRET_SYSTEM_PROMPT,
            "input": query,
            "tools": [{
                "type": "function",
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
                "strict": false
            }],
            "tool_choice": "auto"
        })
    }

    fn structure_body(
        &self,
        query: &str,
        reading: &WeatherReading,
        schema: &Value,
    ) -> Result<Value, QueryError> {
        let raw = serde_json::to_string_pretty(reading)
            .map_err(|e| QueryError::Upstream(format!("Failed to encode weather reading: {e}")))?;
        Ok(json!({
            "model": self.config.model,
            "instructions": STRUCTURE_SYSTEM_PROMPT,
            "input": format!("User question: {query}\n\nRaw weather data:\n{raw}"),
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": STRUCTURED_RESPONSE_NAME,
                    "schema": schema,
                    "strict": true
                }
            }
        }))
    }

    async fn post(&self, body: &Value) -> Result<ResponsesReply, QueryError> {
        let api_key = self.api_key()?;
        let url = format!("{}/responses", self.config.base_url.trim_end_matches('/'));

        let res = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| QueryError::Upstream(format!("Failed to reach language service: {e}")))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| QueryError::Upstream(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| truncate_body(&text));
            warn!(status = status.as_u16(), "Language service returned an error");
            return Err(QueryError::Upstream(format!(
                "request failed with status {status}: {message}"
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| QueryError::Upstream(format!("Malformed response body: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    OutputText { text: String },
    Refusal { refusal: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    FunctionCall { name: String, arguments: String },
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<OutputItem>,
}

impl ResponsesReply {
    fn into_interpretation(self) -> Interpretation {
        let mut text = String::new();
        for item in self.output {
            match item {
                OutputItem::FunctionCall { name, arguments } => {
                    return Interpretation::ToolCall { name, arguments };
                }
                OutputItem::Message { content } => {
                    for part in content {
                        if let ContentPart::OutputText { text: t } = part {
                            text.push_str(&t);
                        }
                    }
                }
                OutputItem::Other => {}
            }
        }
        Interpretation::Answer(text)
    }

    fn into_structured_text(self) -> Result<String, QueryError> {
        let mut text = String::new();
        for item in self.output {
            if let OutputItem::Message { content } = item {
                for part in content {
                    match part {
                        ContentPart::OutputText { text: t } => text.push_str(&t),
                        ContentPart::Refusal { refusal } => {
                            return Err(QueryError::Schema(format!(
                                "language service refused to structure the reading: {refusal}"
                            )));
                        }
                        ContentPart::Other => {}
                    }
                }
            }
        }

        if text.trim().is_empty() {
            return Err(QueryError::Schema("structuring reply contained no output".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl LanguageModel for OpenAiResponsesClient {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn interpret(&self, query: &str, tool: &ToolSpec) -> Result<Interpretation, QueryError> {
        debug!(query, "Interpreting query");
        let reply = self.post(&self.interpret_body(query, tool)).await?;
        Ok(reply.into_interpretation())
    }

    #[instrument(skip_all, fields(model = %self.config.model, location = %reading.location))]
    async fn structure(
        &self,
        query: &str,
        reading: &WeatherReading,
        schema: &Value,
    ) -> Result<String, QueryError> {
        let reply = self.post(&self.structure_body(query, reading, schema)?).await?;
        reply.into_structured_text()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
