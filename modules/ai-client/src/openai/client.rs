use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use super::types::*;
use crate::error::AiError;

pub(crate) const OPENAI_API_URL: &str = "https://api.openai.com/v1";

pub(crate) struct OpenAiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str, http: reqwest::Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            http,
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap, AiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| AiError::Config(format!("invalid API key header: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Send a structured-output request. `Ok(None)` when the model returned no text.
    pub async fn structured_output(
        &self,
        request: &StructuredRequest,
    ) -> Result<Option<String>, AiError> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %request.model, schema = %request.response_format.json_schema.name, "OpenAI structured output request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            let message = serde_json::from_str::<ErrorEnvelope>(&error_text)
                .map(|e| e.error.describe())
                .unwrap_or(error_text);
            return Err(AiError::api(status.as_u16(), message));
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(choice) = chat_response.choices.first() {
            debug!(
                finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
                refused = choice.message.refusal.is_some(),
                prompt_tokens = chat_response.usage.as_ref().map(|u| u.prompt_tokens),
                completion_tokens = chat_response.usage.as_ref().map(|u| u.completion_tokens),
                total_tokens = chat_response.usage.as_ref().map(|u| u.total_tokens),
                "OpenAI structured output response"
            );
        }

        Ok(chat_response.into_text())
    }
}
