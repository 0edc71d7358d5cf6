//! Decoding raw model text into typed results.

use ai_client::{strip_code_fences, truncate_to_char_boundary, AiError};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Decode model output. Missing or blank text is `EmptyResponse`; text that
/// does not match `T` is `Parse`. Nothing is coerced.
pub fn decode<T: DeserializeOwned>(raw: Option<&str>) -> Result<T, AiError> {
    let text = match raw.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Err(AiError::EmptyResponse),
    };

    serde_json::from_str(strip_code_fences(text)).map_err(|e| {
        warn!(
            error = %e,
            preview = truncate_to_char_boundary(text, 200),
            "Failed to decode model response"
        );
        AiError::Parse(e.to_string())
    })
}
