use async_trait::async_trait;
use serde::Serialize;

use crate::error::AiError;

// =============================================================================
// Generation Request
// =============================================================================

/// A single schema-bound generation call: who answers, how they should
/// behave, what they are asked, and the exact shape the answer must take.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub schema_name: String,
    pub schema: serde_json::Value,
}

impl GenerationRequest {
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            prompt: prompt.into(),
            schema_name: "structured_response".to_string(),
            schema: serde_json::Value::Null,
        }
    }

    pub fn with_schema(mut self, name: impl Into<String>, schema: serde_json::Value) -> Self {
        self.schema_name = name.into();
        self.schema = schema;
        self
    }
}

// =============================================================================
// StructuredGenerator Trait
// =============================================================================

/// Performs one generation call.
///
/// `Ok(None)` means the service answered without any text, which callers
/// distinguish from text that fails to decode.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, AiError>;
}

#[async_trait]
impl<G: StructuredGenerator + ?Sized> StructuredGenerator for std::sync::Arc<G> {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, AiError> {
        (**self).generate(request).await
    }
}
