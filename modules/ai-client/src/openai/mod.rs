mod client;
pub(crate) mod schema;
pub(crate) mod types;

pub use schema::StructuredOutput;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AiError;
use crate::traits::{GenerationRequest, StructuredGenerator};
use client::OpenAiClient;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// =============================================================================
// OpenAi Generator
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    http: reqwest::Client,
    base_url: Option<String>,
    temperature: Option<f32>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: reqwest::Client::new(),
            base_url: None,
            temperature: None,
        }
    }

    pub fn from_env() -> Result<Self, AiError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| AiError::Config(format!("{API_KEY_ENV} environment variable not set")))?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sampling temperature, ignored for models that reject one.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key, self.http.clone());
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    fn wire_request(&self, request: &GenerationRequest) -> types::StructuredRequest {
        types::StructuredRequest {
            model: request.model.clone(),
            messages: vec![
                types::WireMessage::system(&request.system),
                types::WireMessage::user(&request.prompt),
            ],
            temperature: if types::rejects_temperature(&request.model) {
                None
            } else {
                self.temperature
            },
            response_format: types::ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: types::JsonSchemaFormat {
                    name: request.schema_name.clone(),
                    strict: true,
                    schema: request.schema.clone(),
                },
            },
        }
    }
}

#[async_trait]
impl StructuredGenerator for OpenAi {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, AiError> {
        if request.schema.is_null() {
            return Err(AiError::Config(format!(
                "request '{}' has no output schema",
                request.schema_name
            )));
        }
        debug!(model = %request.model, prompt_bytes = request.prompt.len(), "Generating");
        self.client()
            .structured_output(&self.wire_request(request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(model: &str) -> GenerationRequest {
        GenerationRequest::new(model, "be terse", "hello")
            .with_schema("reply", serde_json::json!({"type": "object"}))
    }

    #[test]
    fn test_openai_with_base_url() {
        let ai = OpenAi::new("sk-test").with_base_url("https://custom.api.com");
        assert_eq!(ai.base_url, Some("https://custom.api.com".to_string()));
        assert_eq!(ai.api_key(), "sk-test");
    }

    #[test]
    fn wire_request_carries_strict_schema() {
        let ai = OpenAi::new("sk-test").with_temperature(0.9);
        let wire = serde_json::to_value(ai.wire_request(&request("gpt-4o"))).unwrap();

        assert_eq!(wire["model"], "gpt-4o");
        assert_eq!(wire["messages"][0]["role"], "system");
        assert_eq!(wire["messages"][1]["content"], "hello");
        assert_eq!(wire["response_format"]["type"], "json_schema");
        assert_eq!(wire["response_format"]["json_schema"]["name"], "reply");
        assert_eq!(wire["response_format"]["json_schema"]["strict"], true);
        assert!((wire["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn reasoning_models_drop_temperature() {
        let ai = OpenAi::new("sk-test").with_temperature(0.9);
        let wire = serde_json::to_value(ai.wire_request(&request("gpt-5-mini"))).unwrap();
        assert!(wire.get("temperature").is_none());
    }

    #[tokio::test]
    async fn schemaless_request_is_rejected_before_sending() {
        let ai = OpenAi::new("sk-test").with_base_url("http://127.0.0.1:9");
        let err = ai
            .generate(&GenerationRequest::new("gpt-4o", "sys", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Config(_)));
    }
}
