use async_trait::async_trait;

use crate::error::Result;

/// Turns text into a fixed-dimension vector. Callers must treat `Err` as
/// "no vector available" and degrade, never abort the conversation.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimension of the vectors this provider produces.
    fn dimension(&self) -> u64;
}
