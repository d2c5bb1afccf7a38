use async_trait::async_trait;

use crate::error::Result;

/// A structured-generation request. The prompt asks for a JSON object of a
/// schema the caller owns; `web_search` lets the provider ground its answer
/// in current sources (the verification path needs this, extraction does not).
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub web_search: bool,
}

/// Provider-agnostic structured-generation port. Implementations return the
/// model's output parsed as JSON; callers deserialize into their own schema
/// and decide how to handle shapes that do not fit.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<serde_json::Value>;
}
