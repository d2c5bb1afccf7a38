use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub qdrant_url: String,
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub embedding_model: String,
    pub embedding_dimension: u64,
    pub verification_model: String,
    pub extraction_model: String,
    pub server_host: String,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            qdrant_url: std::env::var("QDRANT_URL")
                .unwrap_or_else(|_| "http://localhost:6334".into()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".into()),
            embedding_dimension: std::env::var("EMBEDDING_DIMENSION")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(1536),
            verification_model: std::env::var("VERIFICATION_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-5-20250929".into()),
            extraction_model: std::env::var("EXTRACTION_MODEL")
                .unwrap_or_else(|_| "claude-haiku-4-5-20251001".into()),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}
