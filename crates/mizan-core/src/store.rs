use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entry::{KnowledgeEntry, Region, ScoredEntry};
use crate::error::Result;

/// Persistence port for knowledge entries. The store is append-mostly:
/// entries are inserted, their content replaced in-place on verification, or
/// their verification timestamp refreshed. Nothing is ever deleted.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    async fn insert(&self, entry: &KnowledgeEntry) -> Result<()>;

    /// Nearest-neighbor search filtered to one region, ranked by cosine
    /// similarity, dropping candidates below `min_score`.
    async fn search(
        &self,
        query: Vec<f32>,
        region: Region,
        min_score: f32,
        limit: u64,
    ) -> Result<Vec<ScoredEntry>>;

    /// Full in-place replacement of an existing entry. The caller updates
    /// content, embedding and timestamp together on its copy; the store
    /// persists them in a single write so content and embedding cannot drift.
    async fn replace_content(&self, entry: &KnowledgeEntry) -> Result<()>;

    /// Refresh only the verification timestamp, content untouched.
    async fn touch_verified(&self, id: Uuid, verified_at: DateTime<Utc>) -> Result<()>;

    async fn entry_count(&self) -> Result<u64>;
}
