use std::env;
use std::time::Duration;

use ai_client::retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
use tracing::info;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_RETRY_BASE_MS: u64 = 1000;

/// Configuration for the generation boundary, passed explicitly into the
/// simulator rather than read from ambient state.
#[derive(Debug, Clone)]
pub struct Config {
    // AI provider
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub model: String,

    // Retry
    pub retry_base_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: required_env("OPENAI_API_KEY"),
            openai_base_url: env::var("OPENAI_BASE_URL").ok().filter(|u| !u.is_empty()),
            model: env::var("ECHOROOM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            retry_base_ms: env::var("ECHOROOM_RETRY_BASE_MS")
                .unwrap_or_else(|_| DEFAULT_RETRY_BASE_MS.to_string())
                .parse()
                .expect("ECHOROOM_RETRY_BASE_MS must be a number"),
        }
    }

    /// Config for paths that never call the model (prompt previews, tests).
    pub fn offline(model: impl Into<String>) -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: None,
            model: model.into(),
            retry_base_ms: DEFAULT_RETRY_BASE_MS,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(DEFAULT_MAX_RETRIES, Duration::from_millis(self.retry_base_ms))
    }

    /// Log the effective configuration with secrets masked.
    pub fn log_redacted(&self) {
        info!(
            model = %self.model,
            base_url = self.openai_base_url.as_deref().unwrap_or("default"),
            api_key = %redact(&self.openai_api_key),
            retry_base_ms = self.retry_base_ms,
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        return "<unset>".to_string();
    }
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("***{tail}")
}
