pub mod api_types;
pub mod config;
pub mod embedding;
pub mod entry;
pub mod error;
pub mod oracle;
pub mod policy;
pub mod store;

pub use config::AppConfig;
pub use embedding::EmbeddingProvider;
pub use entry::{KnowledgeEntry, Region, ScoredEntry, Stability};
pub use error::{MizanError, Result};
pub use oracle::{GenerationRequest, StructuredGenerator};
pub use store::KnowledgeStore;
