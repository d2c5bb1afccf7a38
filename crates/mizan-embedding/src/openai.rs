use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mizan_core::config::AppConfig;
use mizan_core::embedding::EmbeddingProvider;
use mizan_core::error::{MizanError, Result};

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Embedding client over the OpenAI embeddings endpoint. Model and dimension
/// are fixed at construction; every stored vector in the knowledge base must
/// come from the same model.
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimension: u64,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            api_key: config.openai_api_key.clone(),
            model: config.embedding_model.clone(),
            dimension: config.embedding_dimension,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: text.to_string(),
        };

        tracing::debug!(
            model = %self.model,
            input_len = text.len(),
            "Sending embedding request"
        );

        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MizanError::Embedding(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(MizanError::Embedding(format!(
                "Embedding API returned status {status}: {body}"
            )));
        }

        let api_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| MizanError::Embedding(format!("Failed to parse API response: {e}")))?;

        let vector = api_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| MizanError::Embedding("Empty embedding response".to_string()))?;

        if vector.len() as u64 != self.dimension {
            return Err(MizanError::Embedding(format!(
                "Unexpected embedding dimension: expected {}, got {}",
                self.dimension,
                vector.len()
            )));
        }

        tracing::debug!(dimension = vector.len(), "Received embedding");

        Ok(vector)
    }

    fn dimension(&self) -> u64 {
        self.dimension
    }
}
