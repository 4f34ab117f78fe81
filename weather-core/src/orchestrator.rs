use tracing::{debug, info, instrument, warn};

use crate::{
    Config,
    error::QueryError,
    language::{Interpretation, LanguageModel, language_model_from_config},
    model::{QueryOutcome, ToolInvocation},
    provider::{WeatherProvider, provider_from_config},
    schema::{
        FALLBACK_MESSAGE, WEATHER_TOOL_NAME, structured_response_schema,
        validate_structured_response, weather_tool,
    },
};

/// Turns a free-text question into a weather report.
///
/// Each call to [`handle`](Self::handle) is independent: up to two language
/// model calls and one provider call, strictly in sequence.
#[derive(Debug)]
pub struct WeatherAssistant {
    language_model: Box<dyn LanguageModel>,
    provider: Box<dyn WeatherProvider>,
}

impl WeatherAssistant {
    pub fn new(language_model: Box<dyn LanguageModel>, provider: Box<dyn WeatherProvider>) -> Self {
        Self { language_model, provider }
    }

    /// Build the assistant with the configured language model and provider.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(language_model_from_config(config)?, provider_from_config(config)?))
    }

    #[instrument(skip_all)]
    pub async fn handle(&self, query: &str) -> Result<QueryOutcome, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::Validation("Query is required".to_string()));
        }
        debug!(query, "Handling weather query");

        let (name, arguments) = match self.language_model.interpret(query, &weather_tool()).await? {
            Interpretation::Answer(text) => {
                info!("Language model answered without a tool call");
                let text = text.trim();
                let message = if text.is_empty() { FALLBACK_MESSAGE } else { text };
                return Ok(QueryOutcome::Message(message.to_string()));
            }
            Interpretation::ToolCall { name, arguments } => (name, arguments),
        };

        if name != WEATHER_TOOL_NAME {
            return Err(QueryError::Upstream(format!("Unknown tool requested: {name}")));
        }

        let invocation: ToolInvocation = serde_json::from_str(&arguments).map_err(|e| {
            QueryError::Upstream(format!("Malformed {WEATHER_TOOL_NAME} arguments: {e}"))
        })?;
        info!(
            location = %invocation.location_name,
            lat = invocation.latitude,
            lon = invocation.longitude,
            "Language model requested weather data"
        );

        let raw_weather = self.provider.get_weather(&invocation).await.map_err(|e| {
            warn!(error = %e, "Weather fetch failed");
            QueryError::from(e)
        })?;

        let reply = self
            .language_model
            .structure(query, &raw_weather, &structured_response_schema())
            .await?;
        let data = validate_structured_response(&reply)?;

        Ok(QueryOutcome::Report { data, raw_weather })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        WeatherReading,
        error::WeatherFetchError,
        model::{PressureUnit, TemperatureUnit, VisibilityUnit, WindUnit},
        provider::openmeteo::describe,
        schema::ToolSpec,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{Value, json};
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, Clone, Default)]
    struct Calls {
        interpret: Arc<AtomicUsize>,
        structure: Arc<AtomicUsize>,
        fetch: Arc<AtomicUsize>,
    }

    #[derive(Debug)]
    enum StructureReply {
        /// Echo the reading back inside a conforming payload.
        Echo,
        Raw(String),
    }

    #[derive(Debug)]
    struct FakeModel {
        decision: Interpretation,
        reply: StructureReply,
        calls: Calls,
    }

    #[async_trait]
    impl LanguageModel for FakeModel {
        async fn interpret(
            &self,
            _query: &str,
            tool: &ToolSpec,
        ) -> Result<Interpretation, QueryError> {
            assert_eq!(tool.name, WEATHER_TOOL_NAME);
            self.calls.interpret.fetch_add(1, Ordering::SeqCst);
            Ok(self.decision.clone())
        }

        async fn structure(
            &self,
            query: &str,
            reading: &WeatherReading,
            schema: &Value,
        ) -> Result<String, QueryError> {
            assert_eq!(schema["additionalProperties"], json!(false));
            self.calls.structure.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                StructureReply::Echo => Ok(json!({
                    "weather_data": reading,
                    "summary": format!("Answer to: {query}"),
                    "recommendations": ["first", "second", "third"],
                    "additional_info": ""
                })
                .to_string()),
                StructureReply::Raw(s) => Ok(s.clone()),
            }
        }
    }

    #[derive(Debug)]
    struct FakeProvider {
        code: i64,
        fail: bool,
        calls: Calls,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn get_weather(
            &self,
            inv: &ToolInvocation,
        ) -> Result<WeatherReading, WeatherFetchError> {
            self.calls.fetch.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WeatherFetchError::Provider {
                    status: 400,
                    reason: "Latitude must be in range of -90 to 90°".into(),
                });
            }
            let condition = crate::normalize::code_to_condition(self.code).to_string();
            Ok(WeatherReading {
                location: inv.location_name.clone(),
                temperature: 21.0,
                temperature_unit: inv.temperature_unit(),
                description: describe(&inv.location_name, &condition, 21.0, inv.temperature_unit()),
                condition,
                humidity: 50.0,
                wind_speed: 5.0,
                wind_unit: inv.wind_unit(),
                wind_direction: 90.0,
                pressure: 1012.0,
                pressure_unit: inv.pressure_unit(),
                visibility: 10.0,
                visibility_unit: inv.visibility_unit(),
                precipitation: 0.0,
                cloud_cover: 40.0,
                uv_index: 0.0,
                feels_like: 20.0,
                timestamp: Utc::now(),
            })
        }
    }

    fn paris_call() -> Interpretation {
        Interpretation::ToolCall {
            name: WEATHER_TOOL_NAME.into(),
            arguments: json!({
                "latitude": 48.8566,
                "longitude": 2.3522,
                "location_name": "Paris",
                "temperature_unit": "celsius"
            })
            .to_string(),
        }
    }

    fn assistant(
        decision: Interpretation,
        reply: StructureReply,
        fail_fetch: bool,
    ) -> (WeatherAssistant, Calls) {
        let calls = Calls::default();
        let model = FakeModel { decision, reply, calls: calls.clone() };
        let provider = FakeProvider { code: 2, fail: fail_fetch, calls: calls.clone() };
        (WeatherAssistant::new(Box::new(model), Box::new(provider)), calls)
    }

    fn counts(calls: &Calls) -> (usize, usize, usize) {
        (
            calls.interpret.load(Ordering::SeqCst),
            calls.fetch.load(Ordering::SeqCst),
            calls.structure.load(Ordering::SeqCst),
        )
    }

    #[tokio::test]
    async fn blank_queries_make_no_calls() {
        let (assistant, calls) = assistant(paris_call(), StructureReply::Echo, false);

        for q in ["", " ", "\t\n", "   \r\n  "] {
            let err = assistant.handle(q).await.unwrap_err();
            assert!(matches!(err, QueryError::Validation(_)), "query {q:?}");
        }
        assert_eq!(counts(&calls), (0, 0, 0));
    }

    #[tokio::test]
    async fn tool_call_round_trip_produces_report() {
        let (assistant, calls) = assistant(paris_call(), StructureReply::Echo, false);

        let outcome = assistant.handle("What's the weather in Paris?").await.unwrap();
        let QueryOutcome::Report { data, raw_weather } = outcome else {
            panic!("expected a report");
        };

        assert_eq!(raw_weather.condition, "partly cloudy");
        assert!(raw_weather.description.contains("Current weather in Paris: partly cloudy"));
        assert_eq!(raw_weather.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(raw_weather.wind_unit, WindUnit::Kmh);
        assert_eq!(raw_weather.pressure_unit, PressureUnit::HPa);
        assert_eq!(raw_weather.visibility_unit, VisibilityUnit::Km);

        assert_eq!(data.weather_data, raw_weather);
        assert_eq!(data.summary, "Answer to: What's the weather in Paris?");
        assert_eq!(data.recommendations, vec!["first", "second", "third"]);
        assert_eq!(counts(&calls), (1, 1, 1));
    }

    #[tokio::test]
    async fn direct_answer_skips_fetch_and_structuring() {
        let (assistant, calls) = assistant(
            Interpretation::Answer("Which city do you mean?".into()),
            StructureReply::Echo,
            false,
        );

        let outcome = assistant.handle("Is it nice out?").await.unwrap();
        assert_eq!(outcome, QueryOutcome::Message("Which city do you mean?".into()));
        assert_eq!(counts(&calls), (1, 0, 0));
    }

    #[tokio::test]
    async fn empty_direct_answer_uses_fallback() {
        let (assistant, _) =
            assistant(Interpretation::Answer("  ".into()), StructureReply::Echo, false);

        let outcome = assistant.handle("hello").await.unwrap();
        assert_eq!(outcome, QueryOutcome::Message(FALLBACK_MESSAGE.into()));
    }

    #[tokio::test]
    async fn fetch_failure_is_terminal() {
        let (assistant, calls) = assistant(paris_call(), StructureReply::Echo, true);

        let err = assistant.handle("Weather in Paris").await.unwrap_err();
        assert!(matches!(err, QueryError::WeatherFetch(_)));
        assert!(err.to_string().contains("Latitude must be in range"));
        assert_eq!(counts(&calls), (1, 1, 0));
    }

    #[tokio::test]
    async fn malformed_arguments_are_upstream_errors() {
        let (assistant, calls) = assistant(
            Interpretation::ToolCall {
                name: WEATHER_TOOL_NAME.into(),
                arguments: "{\"latitude\": \"north\"}".into(),
            },
            StructureReply::Echo,
            false,
        );

        let err = assistant.handle("Weather somewhere").await.unwrap_err();
        assert!(matches!(err, QueryError::Upstream(_)));
        assert_eq!(counts(&calls), (1, 0, 0));
    }

    #[tokio::test]
    async fn unknown_tool_is_upstream_error() {
        let (assistant, calls) = assistant(
            Interpretation::ToolCall { name: "get_stock_price".into(), arguments: "{}".into() },
            StructureReply::Echo,
            false,
        );

        let err = assistant.handle("AAPL?").await.unwrap_err();
        assert!(matches!(err, QueryError::Upstream(_)));
        assert_eq!(counts(&calls), (1, 0, 0));
    }

    #[tokio::test]
    async fn non_conforming_structure_is_schema_error() {
        let (assistant, calls) = assistant(
            paris_call(),
            StructureReply::Raw(json!({ "summary": "nice", "recommendations": [] }).to_string()),
            false,
        );

        let err = assistant.handle("Weather in Paris").await.unwrap_err();
        assert!(matches!(err, QueryError::Schema(_)));
        assert_eq!(counts(&calls), (1, 1, 1));
    }
}
