use thiserror::Error;

/// Message fragments that mark a rate-limit failure when no status code survived
/// the trip through the transport layer.
const RATE_LIMIT_MARKERS: &[&str] = &[
    "429",
    "rate limit",
    "rate-limit",
    "too many requests",
    "resource_exhausted",
];

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Empty response from model")]
    EmptyResponse,
}

impl AiError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        AiError::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this failure is a rate-limit signal.
    ///
    /// Looks at the structured status first, then falls back to scanning the
    /// message so that errors flattened into strings are still recognised.
    pub fn is_rate_limit(&self) -> bool {
        if self.status() == Some(429) {
            return true;
        }
        match self {
            AiError::Api { message, .. } | AiError::Network(message) => {
                message_signals_rate_limit(message)
            }
            _ => false,
        }
    }
}

/// Case-insensitive scan for rate-limit markers in an unstructured message.
pub fn message_signals_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m))
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => AiError::api(status.as_u16(), e.to_string()),
            None => AiError::Network(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for AiError {
    fn from(e: serde_json::Error) -> Self {
        AiError::Parse(e.to_string())
    }
}
